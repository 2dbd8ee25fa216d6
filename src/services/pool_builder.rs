//! 题库构建服务 - 业务能力层
//!
//! 源文档文本 → 分段 → 定稿 → 题库。一次遍历同时得到两种表示：
//! - 组卷用的紧凑题库（单元 → 题目列表，不含题号）
//! - 持久化用的题目记录（扁平表格，每行一题，含单元和题号）

use tracing::debug;

use crate::models::{BuiltPool, QuestionRecord};
use crate::services::block_finalizer::BlockFinalizer;
use crate::services::segmenter::BlockSegmenter;

/// 题库构建服务
pub struct PoolBuilder {
    segmenter: BlockSegmenter,
    finalizer: BlockFinalizer,
}

impl PoolBuilder {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            segmenter: BlockSegmenter::new()?,
            finalizer: BlockFinalizer::new()?,
        })
    }

    /// 从源文档文本提取题目记录（按提取顺序）
    pub fn records(&self, raw_text: &str) -> Vec<QuestionRecord> {
        let blocks = self.segmenter.segment(raw_text);
        debug!("分段完成: {} 个题目块", blocks.len());

        blocks
            .iter()
            .filter_map(|block| self.finalizer.finalize(block))
            .collect()
    }

    /// 从源文档文本构建题库
    pub fn build(&self, raw_text: &str) -> BuiltPool {
        BuiltPool::from_records(self.records(raw_text))
    }
}
