//! 题库提取流程 - 流程层
//!
//! 核心职责：定义"一份源文档"的完整提取流程
//!
//! 流程顺序：
//! 1. 读取源文档文本（空文本视为输入错误）
//! 2. 分段 → 提取标记 → 构建题库
//! 3. 整体写入题库存储（同一文档ID重复提取时覆盖）

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{AppResult, SourceError};
use crate::infrastructure::{PoolStore, SourceReader, SourceTextProvider};
use crate::models::ExtractionSummary;
use crate::services::PoolBuilder;
use crate::utils::logging::truncate_text;

/// 题库提取流程
///
/// - 不持有题库数据，只依赖存储能力
/// - 可被多个文档并发复用（分段状态只存在于单次调用内）
pub struct ExtractionFlow {
    builder: PoolBuilder,
    store: Arc<dyn PoolStore>,
    reader: Box<dyn SourceTextProvider>,
    verbose_logging: bool,
}

impl ExtractionFlow {
    /// 创建新的提取流程，默认读取 `.txt` / `.pdf`
    pub fn new(store: Arc<dyn PoolStore>) -> AppResult<Self> {
        Ok(Self {
            builder: PoolBuilder::new()?,
            store,
            reader: Box::new(SourceReader::new()),
            verbose_logging: false,
        })
    }

    /// 替换源文档读取方式
    pub fn with_reader(mut self, reader: Box<dyn SourceTextProvider>) -> Self {
        self.reader = reader;
        self
    }

    /// 逐题打印预览
    pub fn with_verbose_logging(mut self, verbose_logging: bool) -> Self {
        self.verbose_logging = verbose_logging;
        self
    }

    /// 从已提取的文本构建并保存题库
    pub fn extract(&self, document_id: &str, raw_text: &str) -> AppResult<ExtractionSummary> {
        if raw_text.trim().is_empty() {
            return Err(SourceError::EmptyText {
                document_id: document_id.to_string(),
            }
            .into());
        }

        let built = self.builder.build(raw_text);
        if built.pool.is_empty() {
            warn!("⚠️ 文档 {} 中没有识别出任何题目", document_id);
        }
        if self.verbose_logging {
            for record in &built.records {
                info!(
                    "  单元 {} | {} | {}",
                    record.unit,
                    record.grading_tag.canonical(),
                    truncate_text(&record.question_text, 50)
                );
            }
        }

        self.store.put(document_id, &built)?;

        let summary = ExtractionSummary {
            document_id: document_id.to_string(),
            unit_counts: built.pool.unit_counts(),
            total_questions: built.pool.total_questions(),
        };
        info!("✓ 题库已保存: {}", summary);
        Ok(summary)
    }

    /// 读取源文档文件并提取
    pub fn extract_file(&self, document_id: &str, path: &Path) -> AppResult<ExtractionSummary> {
        let raw_text = self.reader.read_text(path)?;
        self.extract(document_id, &raw_text)
    }
}
