use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::models::grading_tag::GradingTag;
use crate::models::unit::Unit;

/// 源文档中的一行文本（带原始行号）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub ordinal: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(ordinal: usize, text: impl Into<String>) -> Self {
        Self {
            ordinal,
            text: text.into(),
        }
    }
}

/// 归属于某个单元的一段连续文本行，尚未提取评分标记
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBlock {
    pub unit: Unit,
    pub lines: Vec<RawLine>,
}

impl QuestionBlock {
    /// 以换行拼接所有行
    pub fn joined_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 最终的题目记录
///
/// 记录的身份由提取顺序决定，不生成额外的键。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub unit: Unit,
    /// 来自 `1.` / `1)` 前缀的原始题号
    pub serial_number: Option<u32>,
    pub question_text: String,
    pub grading_tag: GradingTag,
}

/// 组卷用的紧凑题目条目（不含题号）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub text: String,
    #[serde(default)]
    pub metadata: GradingTag,
}

impl PoolEntry {
    pub fn new(text: impl Into<String>, metadata: GradingTag) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

impl From<&QuestionRecord> for PoolEntry {
    fn from(record: &QuestionRecord) -> Self {
        Self {
            text: record.question_text.clone(),
            metadata: record.grading_tag,
        }
    }
}

/// 扁平表格中的一行，列顺序即持久化顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRow {
    pub unit: Unit,
    pub question_number: Option<u32>,
    pub question_text: String,
    pub taxonomy_level: Option<u32>,
    pub course_outcome: Option<u32>,
    pub marks: Option<u32>,
    /// 预留的"OR 配对"标记，目前恒为默认值
    #[serde(default, deserialize_with = "lenient_bool")]
    pub has_or: bool,
}

/// 宽松的布尔列：`true` / `True` / `1` / `yes` 为真，其余（含空值）为假
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    let normalized = raw.map(|v| v.trim().to_ascii_lowercase());
    Ok(matches!(normalized.as_deref(), Some("true" | "1" | "yes" | "y")))
}

impl From<&QuestionRecord> for QuestionRow {
    fn from(record: &QuestionRecord) -> Self {
        Self {
            unit: record.unit,
            question_number: record.serial_number,
            question_text: record.question_text.clone(),
            taxonomy_level: record.grading_tag.taxonomy_level,
            course_outcome: record.grading_tag.course_outcome,
            marks: record.grading_tag.marks,
            has_or: false,
        }
    }
}

impl From<QuestionRow> for QuestionRecord {
    fn from(row: QuestionRow) -> Self {
        Self {
            unit: row.unit,
            serial_number: row.question_number,
            question_text: row.question_text,
            grading_tag: GradingTag {
                taxonomy_level: row.taxonomy_level,
                course_outcome: row.course_outcome,
                marks: row.marks,
            },
        }
    }
}

/// 单个单元下的题目列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitQuestions {
    pub unit: Unit,
    pub questions: Vec<PoolEntry>,
}

/// 题库：单元 → 有序题目列表
///
/// 单元按首次出现的顺序排列，同一单元的题目保持提取顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPool {
    units: Vec<UnitQuestions>,
}

impl QuestionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取（必要时创建）某单元的题目列表
    pub fn unit_mut(&mut self, unit: Unit) -> &mut Vec<PoolEntry> {
        let position = match self.units.iter().position(|u| u.unit == unit) {
            Some(position) => position,
            None => {
                self.units.push(UnitQuestions {
                    unit,
                    questions: Vec::new(),
                });
                self.units.len() - 1
            }
        };
        &mut self.units[position].questions
    }

    /// 向某单元追加一道题
    pub fn push(&mut self, unit: Unit, entry: PoolEntry) {
        self.unit_mut(unit).push(entry);
    }

    /// 按题库顺序遍历单元
    pub fn units(&self) -> impl Iterator<Item = &UnitQuestions> {
        self.units.iter()
    }

    /// 某单元的题目，单元不存在时返回空切片
    pub fn questions(&self, unit: Unit) -> &[PoolEntry] {
        self.units
            .iter()
            .find(|u| u.unit == unit)
            .map(|u| u.questions.as_slice())
            .unwrap_or(&[])
    }

    /// 各单元题目数量
    pub fn unit_counts(&self) -> Vec<(Unit, usize)> {
        self.units
            .iter()
            .map(|u| (u.unit, u.questions.len()))
            .collect()
    }

    pub fn total_questions(&self) -> usize {
        self.units.iter().map(|u| u.questions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// 按单元分组，单元顺序为首次出现的顺序
    pub fn from_records(records: &[QuestionRecord]) -> Self {
        let mut pool = Self::new();
        for record in records {
            pool.push(record.unit, PoolEntry::from(record));
        }
        pool
    }

    /// 从扁平表格重新分组
    pub fn from_rows(rows: Vec<QuestionRow>) -> Self {
        let records: Vec<QuestionRecord> = rows.into_iter().map(QuestionRecord::from).collect();
        Self::from_records(&records)
    }
}

/// 一次提取得到的两种表示：题目记录（扁平表格的来源）和紧凑题库
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltPool {
    pub records: Vec<QuestionRecord>,
    pub pool: QuestionPool,
}

impl BuiltPool {
    pub fn from_records(records: Vec<QuestionRecord>) -> Self {
        let pool = QuestionPool::from_records(&records);
        Self { records, pool }
    }

    /// 扁平表格的所有行，顺序即提取顺序
    pub fn rows(&self) -> Vec<QuestionRow> {
        self.records.iter().map(QuestionRow::from).collect()
    }
}

impl Serialize for QuestionPool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.units.len()))?;
        for unit in &self.units {
            map.serialize_entry(&unit.unit.key(), &unit.questions)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QuestionPool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PoolVisitor;

        impl<'de> Visitor<'de> for PoolVisitor {
            type Value = QuestionPool;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of unit keys to question lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pool = QuestionPool::new();
                while let Some(key) = access.next_key::<String>()? {
                    match Unit::from_key(&key) {
                        Some(unit) => {
                            let questions: Vec<PoolEntry> = access.next_value()?;
                            pool.unit_mut(unit).extend(questions);
                        }
                        None => {
                            tracing::debug!("忽略无法识别的单元键: {}", key);
                            access.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(pool)
            }
        }

        deserializer.deserialize_map(PoolVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_keep_first_appearance_order() {
        let mut pool = QuestionPool::new();
        pool.push(Unit::Two, PoolEntry::new("b", GradingTag::default()));
        pool.push(Unit::One, PoolEntry::new("a", GradingTag::default()));
        pool.push(Unit::Two, PoolEntry::new("c", GradingTag::default()));

        let order: Vec<Unit> = pool.units().map(|u| u.unit).collect();
        assert_eq!(order, vec![Unit::Two, Unit::One]);
        assert_eq!(pool.questions(Unit::Two).len(), 2);
        assert_eq!(pool.total_questions(), 3);
    }

    #[test]
    fn test_nested_json_preserves_order_and_skips_unknown_keys() {
        let json = r#"{
            "UNIT-3": [{"text": "q3", "metadata": {"level": "1", "co": "2", "marks": "6", "raw": ""}}],
            "ALL": [{"text": "ignored"}],
            "UNIT-1": [{"text": "q1"}]
        }"#;
        let pool: QuestionPool = serde_json::from_str(json).unwrap();
        let order: Vec<Unit> = pool.units().map(|u| u.unit).collect();
        assert_eq!(order, vec![Unit::Three, Unit::One]);
        assert_eq!(pool.questions(Unit::Three)[0].metadata, GradingTag::new(1, 2, 6));
        assert!(pool.questions(Unit::One)[0].metadata.is_empty());

        let encoded = serde_json::to_string(&pool).unwrap();
        assert!(encoded.find("UNIT-3").unwrap() < encoded.find("UNIT-1").unwrap());
    }
}
