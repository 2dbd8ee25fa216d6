use serde::{Deserialize, Serialize};

/// 评分标记：认知层级（L）、课程目标（CO）、分值（M）
///
/// 三个字段全部为空是合法状态，表示题目文本中没有找到标记。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TagWire", into = "TagWire")]
pub struct GradingTag {
    pub taxonomy_level: Option<u32>,
    pub course_outcome: Option<u32>,
    pub marks: Option<u32>,
}

impl GradingTag {
    pub fn new(taxonomy_level: u32, course_outcome: u32, marks: u32) -> Self {
        Self {
            taxonomy_level: Some(taxonomy_level),
            course_outcome: Some(course_outcome),
            marks: Some(marks),
        }
    }

    /// 从正则捕获的数字串构造，溢出的数字按空字段处理
    pub fn from_digits(level: &str, co: &str, marks: &str) -> Self {
        Self {
            taxonomy_level: level.parse().ok(),
            course_outcome: co.parse().ok(),
            marks: marks.parse().ok(),
        }
    }

    /// 是否没有任何字段
    pub fn is_empty(&self) -> bool {
        self.taxonomy_level.is_none() && self.course_outcome.is_none() && self.marks.is_none()
    }

    /// 规范化显示形式：`CO<co>    L<level>    <marks>M`，空标记返回空串
    pub fn canonical(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!(
            "CO{}    L{}    {}M",
            field_text(self.course_outcome),
            field_text(self.taxonomy_level),
            field_text(self.marks)
        )
    }
}

fn field_text(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_field(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

/// 嵌套题库格式中的 `metadata` 对象，字段均为字符串
#[derive(Debug, Default, Serialize, Deserialize)]
struct TagWire {
    #[serde(default)]
    level: String,
    #[serde(default)]
    co: String,
    #[serde(default)]
    marks: String,
    #[serde(default)]
    raw: String,
}

impl From<TagWire> for GradingTag {
    fn from(wire: TagWire) -> Self {
        Self {
            taxonomy_level: parse_field(&wire.level),
            course_outcome: parse_field(&wire.co),
            marks: parse_field(&wire.marks),
        }
    }
}

impl From<GradingTag> for TagWire {
    fn from(tag: GradingTag) -> Self {
        Self {
            level: field_text(tag.taxonomy_level),
            co: field_text(tag.course_outcome),
            marks: field_text(tag.marks),
            raw: tag.canonical(),
        }
    }
}
