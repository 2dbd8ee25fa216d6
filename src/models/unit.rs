/// 教学大纲单元
///
/// 题库中所有题目都归属于且仅归属于一个单元。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Unit {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl Unit {
    /// 全部单元，按编号排序
    pub const ALL: [Unit; 5] = [Unit::One, Unit::Two, Unit::Three, Unit::Four, Unit::Five];

    /// 获取单元编号（1-5）
    pub fn number(self) -> u8 {
        self as u8
    }

    /// 从编号解析单元
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(Unit::One),
            2 => Some(Unit::Two),
            3 => Some(Unit::Three),
            4 => Some(Unit::Four),
            5 => Some(Unit::Five),
            _ => None,
        }
    }

    /// 从单元标题中的编号记号解析单元
    ///
    /// 支持罗马数字（I-V）、英文单词（ONE-FIVE）和阿拉伯数字，大小写不敏感。
    /// 无法识别的记号返回 `None`，调用方应保持当前单元不变。
    pub fn from_header_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "I" | "1" | "ONE" => Some(Unit::One),
            "II" | "2" | "TWO" => Some(Unit::Two),
            "III" | "3" | "THREE" => Some(Unit::Three),
            "IV" | "4" | "FOUR" => Some(Unit::Four),
            "V" | "5" | "FIVE" => Some(Unit::Five),
            _ => None,
        }
    }

    /// 嵌套题库格式中使用的键，例如 `UNIT-1`
    pub fn key(self) -> String {
        format!("UNIT-{}", self.number())
    }

    /// 解析嵌套题库格式中的键
    ///
    /// 接受 `UNIT-1`、`UNIT II`、`3` 等写法。
    pub fn from_key(key: &str) -> Option<Self> {
        let trimmed = key.trim();
        let token = match trimmed.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("UNIT") => trimmed[4..]
                .trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == ':' || c == '–'),
            _ => trimmed,
        };
        Self::from_header_token(token)
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::One
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.to_string()
    }
}

impl TryFrom<String> for Unit {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Unit::from_key(&value).ok_or_else(|| format!("无法识别的单元: {}", value))
    }
}
