use std::path::PathBuf;

use crate::models::paper::VariantLabel;
use crate::models::unit::Unit;

/// 题库提取结果摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub document_id: String,
    /// 各单元题目数量（按题库顺序）
    pub unit_counts: Vec<(Unit, usize)>,
    pub total_questions: usize,
}

impl std::fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<String> = self
            .unit_counts
            .iter()
            .map(|(unit, count)| format!("{}={}", unit.key(), count))
            .collect();
        write!(
            f,
            "{}: {} 道题 [{}]",
            self.document_id,
            self.total_questions,
            counts.join(", ")
        )
    }
}

/// 单套试卷的生成状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantStatus {
    /// 已生成并写出
    Generated { output: PathBuf },
    /// 生成失败（不会自动重试）
    Failed { reason: String },
}

/// 单套试卷的生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantOutcome {
    pub label: VariantLabel,
    pub status: VariantStatus,
}

impl VariantOutcome {
    pub fn output(&self) -> Option<&PathBuf> {
        match &self.status {
            VariantStatus::Generated { output } => Some(output),
            VariantStatus::Failed { .. } => None,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.status, VariantStatus::Generated { .. })
    }
}

/// 一次组卷请求的结果，按 A、B、C ... 排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    pub document_id: String,
    /// 本次生成共享的时间戳（毫秒）
    pub timestamp: i64,
    pub variants: Vec<VariantOutcome>,
}

impl AssemblyReport {
    pub fn generated_count(&self) -> usize {
        self.variants.iter().filter(|v| v.is_generated()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.variants.len() - self.generated_count()
    }
}
