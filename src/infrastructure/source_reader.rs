//! 源文档读取 - 基础设施层
//!
//! 只负责"把上传的文件变成一整段文本"，不做任何分段或清洗

use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

use crate::error::SourceError;

/// 源文档文本提供者
pub trait SourceTextProvider: Send + Sync {
    /// 读取一份源文档的全部文本
    fn read_text(&self, path: &Path) -> Result<String, SourceError>;
}

/// 读取 `.txt` / `.pdf` 源文档
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceReader;

impl SourceReader {
    pub fn new() -> Self {
        Self
    }

    /// 是否为支持的源文档格式
    pub fn is_supported(path: &Path) -> bool {
        matches!(extension(path).as_deref(), Some("txt") | Some("pdf"))
    }

    fn read_plain(path: &Path) -> Result<String, SourceError> {
        let bytes = std::fs::read(path).map_err(|source| SourceError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// 逐页提取文本，空白页跳过，页与页之间以换行连接
    fn read_pdf(path: &Path) -> Result<String, SourceError> {
        let doc = Document::load(path).map_err(|e| SourceError::DecodeFailed {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        let pages = doc.get_pages();
        debug!("{} 共 {} 页", path.display(), pages.len());

        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) if !text.trim().is_empty() => texts.push(text),
                Ok(_) => debug!("第 {} 页没有文本", page_number),
                Err(e) => warn!("⚠️ 第 {} 页文本提取失败 ({}): {}", page_number, path.display(), e),
            }
        }

        Ok(texts.join("\n"))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

impl SourceTextProvider for SourceReader {
    fn read_text(&self, path: &Path) -> Result<String, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound {
                path: path.to_path_buf(),
            });
        }

        match extension(path).as_deref() {
            Some("txt") => Self::read_plain(path),
            Some("pdf") => Self::read_pdf(path),
            _ => Err(SourceError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}
