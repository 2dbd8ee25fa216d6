//! 警告写入服务 - 业务能力层
//!
//! 只负责"写 warn.txt"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::VariantLabel;

/// 警告写入服务
///
/// 职责：
/// - 把无法处理的文档 / 生成失败的试卷追加到 warn.txt
/// - 每条记录带上文档ID（和套卷标签），便于手工重试
/// - 不关心流程顺序
#[derive(Debug, Clone)]
pub struct WarnWriter {
    warn_file_path: PathBuf,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self::with_path("warn.txt")
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.warn_file_path
    }

    /// 记录提取失败的文档
    pub fn write_document(&self, document_id: &str, reason: &str) -> Result<()> {
        debug!("写入警告: 文档 {} | {}", document_id, reason);
        self.append(&format!(
            "{} | 文档 {} | 提取失败: {}\n",
            timestamp(),
            document_id,
            one_line(reason)
        ))
    }

    /// 记录生成失败的一套试卷
    pub fn write_variant(&self, document_id: &str, label: VariantLabel, reason: &str) -> Result<()> {
        debug!("写入警告: 文档 {} | {} | {}", document_id, label, reason);
        self.append(&format!(
            "{} | 文档 {} | {} | 生成失败: {}\n",
            timestamp(),
            document_id,
            label,
            one_line(reason)
        ))
    }

    fn append(&self, warn_msg: &str) -> Result<()> {
        if let Some(parent) = self.warn_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)?;

        file.write_all(warn_msg.as_bytes())?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_document_and_variant_failures() {
        let dir = tempfile::tempdir().unwrap();
        let writer = WarnWriter::with_path(dir.path().join("logs").join("warn.txt"));

        writer.write_document("cn_bank", "源文档不存在").unwrap();
        writer
            .write_variant("cn_bank", VariantLabel::from_index(1).unwrap(), "磁盘已满\n重试")
            .unwrap();

        let content = std::fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("文档 cn_bank | 提取失败: 源文档不存在"));
        assert!(lines[1].contains("Set B | 生成失败: 磁盘已满 重试"));
    }
}
