//! 文档处理上下文
//!
//! 封装"我正在处理第几份文档、它的ID是什么"这一信息

use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use tracing::warn;

/// 文档处理上下文
#[derive(Debug, Clone)]
pub struct DocumentCtx {
    /// 文档ID（题库存储的键）
    pub document_id: String,

    /// 文档索引（仅用于日志显示，从1开始）
    pub document_index: usize,
}

impl DocumentCtx {
    /// 创建新的文档上下文
    pub fn new(document_id: impl Into<String>, document_index: usize) -> Self {
        Self {
            document_id: document_id.into(),
            document_index,
        }
    }

    /// 以文件名（不含扩展名）作为文档ID
    pub fn from_path(path: &Path, document_index: usize) -> Self {
        Self::new(stem_of(path), document_index)
    }

    /// 为同一批上传文件建立上下文（索引从1开始）
    ///
    /// 文件名主干重复时（如 `bank.txt` 与 `bank.pdf`），这些文件改用完整文件名作为ID，
    /// 避免并发提取时互相覆盖题库。
    pub fn for_batch(paths: &[PathBuf]) -> Vec<Self> {
        let mut stem_counts: HashMap<String, usize> = HashMap::new();
        for path in paths {
            *stem_counts.entry(stem_of(path)).or_default() += 1;
        }

        paths
            .iter()
            .enumerate()
            .map(|(idx, path)| {
                let stem = stem_of(path);
                let document_id = if stem_counts.get(&stem).copied().unwrap_or(0) > 1 {
                    let file_name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| stem.clone());
                    warn!("⚠️ 多个上传文件同名 {}，改用文档ID {}", stem, file_name);
                    file_name
                } else {
                    stem
                };
                Self::new(document_id, idx + 1)
            })
            .collect()
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文档 {} ID#{}]", self.document_index, self.document_id)
    }
}
