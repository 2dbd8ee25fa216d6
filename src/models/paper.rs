use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::grading_tag::GradingTag;
use crate::models::subject::SubjectMeta;
use crate::models::unit::Unit;

/// 一次请求最少生成的套数
pub const MIN_VARIANTS: usize = 1;
/// 一次请求最多生成的套数（A-Z）
pub const MAX_VARIANTS: usize = 26;
/// 试卷中每道题的固定分值
pub const MARKS_PER_QUESTION: u32 = 12;
/// 每套试卷最多包含的单元数
pub const MAX_UNITS_PER_PAPER: usize = 5;

/// 随机种子来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeedSource {
    /// 使用本次生成的毫秒时间戳
    #[default]
    Clock,
    /// 使用固定的时间戳（可复现）
    Fixed(i64),
}

/// 组卷规格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperSpec {
    pub subject: SubjectMeta,
    /// 请求的套数，实际使用前会被限制在 1..=26
    pub number_of_variants: usize,
    pub seed_source: SeedSource,
    /// 覆盖默认的考试名称行
    pub exam_title: Option<String>,
}

impl PaperSpec {
    pub fn new(subject: SubjectMeta, number_of_variants: usize) -> Self {
        Self {
            subject,
            number_of_variants,
            seed_source: SeedSource::Clock,
            exam_title: None,
        }
    }

    pub fn with_seed_source(mut self, seed_source: SeedSource) -> Self {
        self.seed_source = seed_source;
        self
    }

    pub fn with_exam_title(mut self, exam_title: impl Into<String>) -> Self {
        self.exam_title = Some(exam_title.into());
        self
    }

    /// 实际生成的套数（越界时截断而不是报错）
    pub fn variant_count(&self) -> usize {
        self.number_of_variants.clamp(MIN_VARIANTS, MAX_VARIANTS)
    }
}

/// 套卷标签：A、B、C ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantLabel(char);

impl VariantLabel {
    /// 根据从 0 开始的序号获取标签，超出 A-Z 返回 `None`
    pub fn from_index(index: usize) -> Option<Self> {
        if index < MAX_VARIANTS {
            Some(Self((b'A' + index as u8) as char))
        } else {
            None
        }
    }

    pub fn letter(self) -> char {
        self.0
    }

    /// 从 0 开始的序号
    pub fn index(self) -> usize {
        (self.0 as u8 - b'A') as usize
    }

    /// 输出文件名（不含扩展名）：`Set_<L>_<timestamp>`
    pub fn file_stem(self, timestamp: i64) -> String {
        format!("Set_{}_{}", self.0, timestamp)
    }
}

impl std::fmt::Display for VariantLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Set {}", self.0)
    }
}

/// 试卷中的一道题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSlot {
    /// 卷面题号
    pub serial: u32,
    pub text: String,
    pub tag: GradingTag,
    pub marks: u32,
}

/// 一个单元的"二选一"题对
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSection {
    /// 在试卷中的位置（从 1 开始）
    pub position: usize,
    pub unit: Unit,
    pub primary: QuestionSlot,
    pub alternative: QuestionSlot,
}

/// 一套试卷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperDocument {
    pub label: VariantLabel,
    pub seed: u64,
    pub sections: Vec<UnitSection>,
}

/// 组卷请求文件（TOML）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRequest {
    pub document_id: String,
    #[serde(default)]
    pub num_sets: Option<usize>,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub exam_title: Option<String>,
    #[serde(default)]
    pub subject: SubjectMeta,
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

impl PaperRequest {
    /// 转换为组卷规格
    pub fn to_spec(&self, default_num_sets: usize) -> PaperSpec {
        let seed_source = match self.seed {
            Some(ts) => SeedSource::Fixed(ts),
            None => SeedSource::Clock,
        };
        let mut spec = PaperSpec::new(
            self.subject.clone(),
            self.num_sets.unwrap_or(default_num_sets),
        )
        .with_seed_source(seed_source);
        spec.exam_title = self.exam_title.clone();
        spec
    }

    pub fn with_file_path(mut self, file_path: PathBuf) -> Self {
        self.file_path = Some(file_path);
        self
    }
}
