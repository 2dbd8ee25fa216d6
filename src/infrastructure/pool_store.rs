//! 题库存储 - 基础设施层
//!
//! 题库在提取时整体写入一次，组卷时多次读取。读者可能遇到"还没有题库"，
//! 但不会读到写了一半的题库。
//!
//! 文件布局（每个文档ID一组）：
//! - `<id>_questions.csv`：扁平表格，读取时优先使用
//! - `<id>.json`：按单元嵌套的紧凑题库

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::PoolError;
use crate::models::{BuiltPool, QuestionPool, QuestionRow};

/// 题库存储
pub trait PoolStore: Send + Sync {
    /// 写入（覆盖）某文档的题库
    fn put(&self, document_id: &str, built: &BuiltPool) -> Result<(), PoolError>;

    /// 读取某文档的题库，不存在时返回 `PoolError::NotFound`
    fn get(&self, document_id: &str) -> Result<QuestionPool, PoolError>;
}

/// 把文档ID收敛为安全的文件名主干
///
/// 只保留字母、数字、`-`、`_`、`.`，空白变为 `_`，首尾的 `.` 去掉。
pub fn sanitize_document_id(document_id: &str) -> Result<String, PoolError> {
    let cleaned: String = document_id
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');

    if cleaned.is_empty() {
        return Err(PoolError::InvalidDocumentId {
            document_id: document_id.to_string(),
        });
    }
    Ok(cleaned.to_string())
}

/// 基于文件系统的题库存储
#[derive(Debug, Clone)]
pub struct FsPoolStore {
    root: PathBuf,
}

impl FsPoolStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 扁平表格路径
    pub fn table_path(&self, document_id: &str) -> Result<PathBuf, PoolError> {
        let stem = sanitize_document_id(document_id)?;
        Ok(self.root.join(format!("{}_questions.csv", stem)))
    }

    /// 嵌套题库路径
    pub fn nested_path(&self, document_id: &str) -> Result<PathBuf, PoolError> {
        let stem = sanitize_document_id(document_id)?;
        Ok(self.root.join(format!("{}.json", stem)))
    }

    /// 把内容写到同目录的临时文件，尚未改名
    fn stage<F>(&self, path: &Path, write_body: F) -> Result<NamedTempFile, PoolError>
    where
        F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<(), PoolError>,
    {
        let write_failed = |source: std::io::Error| PoolError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(&self.root).map_err(write_failed)?;
        let mut temp = NamedTempFile::new_in(&self.root).map_err(write_failed)?;
        {
            let mut writer = BufWriter::new(&mut temp);
            write_body(&mut writer)?;
            writer.flush().map_err(write_failed)?;
        }
        Ok(temp)
    }

    /// 临时文件原子改名为正式文件
    fn commit(temp: NamedTempFile, path: &Path) -> Result<(), PoolError> {
        temp.persist(path).map_err(|e| PoolError::WriteFailed {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }

    fn read_table(path: &Path) -> Result<QuestionPool, PoolError> {
        let file = File::open(path).map_err(|source| PoolError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let rows = csv::Reader::from_reader(BufReader::new(file))
            .deserialize()
            .collect::<Result<Vec<QuestionRow>, csv::Error>>()
            .map_err(|source| PoolError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(QuestionPool::from_rows(rows))
    }

    fn read_nested(path: &Path) -> Result<QuestionPool, PoolError> {
        let file = File::open(path).map_err(|source| PoolError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| PoolError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl PoolStore for FsPoolStore {
    /// 两个文件都写好临时文件后才改名，表格先改名
    ///
    /// `get` 优先读表格：任一步失败时，读者看到的要么是旧题库，要么是新题库。
    fn put(&self, document_id: &str, built: &BuiltPool) -> Result<(), PoolError> {
        let nested_path = self.nested_path(document_id)?;
        let table_path = self.table_path(document_id)?;

        let rows = built.rows();
        let table = self.stage(&table_path, |writer| {
            let csv_error = |source| PoolError::Csv {
                path: table_path.clone(),
                source,
            };
            let mut csv_writer = csv::Writer::from_writer(writer);
            for row in &rows {
                csv_writer.serialize(row).map_err(csv_error)?;
            }
            csv_writer.flush().map_err(|source| PoolError::WriteFailed {
                path: table_path.clone(),
                source,
            })
        })?;

        let nested = self.stage(&nested_path, |writer| {
            serde_json::to_writer_pretty(writer, &built.pool).map_err(|source| PoolError::Json {
                path: nested_path.clone(),
                source,
            })
        })?;

        Self::commit(table, &table_path)?;
        Self::commit(nested, &nested_path)?;

        debug!(
            "题库已写入: {} ({} 行)",
            table_path.display(),
            rows.len()
        );
        Ok(())
    }

    fn get(&self, document_id: &str) -> Result<QuestionPool, PoolError> {
        let table_path = self.table_path(document_id)?;
        if table_path.exists() {
            return Self::read_table(&table_path);
        }

        let nested_path = self.nested_path(document_id)?;
        if nested_path.exists() {
            return Self::read_nested(&nested_path);
        }

        Err(PoolError::NotFound {
            document_id: document_id.to_string(),
        })
    }
}

/// 内存题库存储
#[derive(Debug, Default)]
pub struct MemoryPoolStore {
    pools: RwLock<HashMap<String, BuiltPool>>,
}

impl MemoryPoolStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PoolStore for MemoryPoolStore {
    fn put(&self, document_id: &str, built: &BuiltPool) -> Result<(), PoolError> {
        let key = sanitize_document_id(document_id)?;
        let mut pools = self.pools.write().unwrap_or_else(|e| e.into_inner());
        pools.insert(key, built.clone());
        Ok(())
    }

    fn get(&self, document_id: &str) -> Result<QuestionPool, PoolError> {
        let key = sanitize_document_id(document_id)?;
        let pools = self.pools.read().unwrap_or_else(|e| e.into_inner());
        pools
            .get(&key)
            .map(|built| built.pool.clone())
            .ok_or_else(|| PoolError::NotFound {
                document_id: document_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GradingTag, QuestionRecord, Unit};

    fn sample() -> BuiltPool {
        BuiltPool::from_records(vec![
            QuestionRecord {
                unit: Unit::Two,
                serial_number: Some(1),
                question_text: "Explain paging,\nwith \"frames\".".to_string(),
                grading_tag: GradingTag::new(2, 1, 10),
            },
            QuestionRecord {
                unit: Unit::One,
                serial_number: None,
                question_text: "Define a socket.".to_string(),
                grading_tag: GradingTag::default(),
            },
            QuestionRecord {
                unit: Unit::Two,
                serial_number: Some(3),
                question_text: "Explain TLB.".to_string(),
                grading_tag: GradingTag::new(3, 2, 12),
            },
        ])
    }

    #[test]
    fn test_sanitize_document_id() {
        assert_eq!(sanitize_document_id("cn bank 2024").unwrap(), "cn_bank_2024");
        assert_eq!(sanitize_document_id("../../etc/passwd").unwrap(), "etcpasswd");
        assert!(matches!(
            sanitize_document_id("/..//"),
            Err(PoolError::InvalidDocumentId { .. })
        ));
    }

    #[test]
    fn test_fs_round_trip_prefers_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPoolStore::new(dir.path());
        let built = sample();

        store.put("os-bank", &built).unwrap();
        assert!(dir.path().join("os-bank_questions.csv").exists());
        assert!(dir.path().join("os-bank.json").exists());

        let header = std::fs::read_to_string(dir.path().join("os-bank_questions.csv")).unwrap();
        assert!(header.starts_with(
            "unit,question_number,question_text,taxonomy_level,course_outcome,marks,has_or"
        ));

        assert_eq!(store.get("os-bank").unwrap(), built.pool);
    }

    #[test]
    fn test_falls_back_to_nested_form() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPoolStore::new(dir.path());
        let built = sample();

        store.put("os-bank", &built).unwrap();
        std::fs::remove_file(dir.path().join("os-bank_questions.csv")).unwrap();

        assert_eq!(store.get("os-bank").unwrap(), built.pool);
    }

    #[test]
    fn test_table_written_by_other_tools_loads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("legacy_questions.csv"),
            "unit,question_number,question_text,taxonomy_level,course_outcome,marks,has_or\n\
             UNIT-1,1,Explain paging.,2,1,12,False\n\
             UNIT-1,2,Explain TLB.,,,,0\n\
             UNIT-2,3,Define a socket.,3,2,12,\n",
        )
        .unwrap();

        let pool = FsPoolStore::new(dir.path()).get("legacy").unwrap();
        assert_eq!(pool.unit_counts(), vec![(Unit::One, 2), (Unit::Two, 1)]);
        assert_eq!(pool.questions(Unit::One)[0].metadata, GradingTag::new(2, 1, 12));
        assert!(pool.questions(Unit::One)[1].metadata.is_empty());
    }

    #[test]
    fn test_failed_put_keeps_table_current() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPoolStore::new(dir.path());
        store.put("bank", &sample()).unwrap();

        // 让嵌套文件无法改名
        std::fs::remove_file(dir.path().join("bank.json")).unwrap();
        std::fs::create_dir(dir.path().join("bank.json")).unwrap();
        std::fs::write(dir.path().join("bank.json").join("keep"), "x").unwrap();

        let smaller = BuiltPool::from_records(sample().records.into_iter().take(1).collect());
        assert!(matches!(
            store.put("bank", &smaller),
            Err(PoolError::WriteFailed { .. })
        ));
        assert_eq!(store.get("bank").unwrap(), smaller.pool);
    }

    #[test]
    fn test_missing_pool_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPoolStore::new(dir.path().join("never-created"));
        assert!(matches!(store.get("nothing"), Err(PoolError::NotFound { .. })));

        let memory = MemoryPoolStore::new();
        assert!(matches!(memory.get("nothing"), Err(PoolError::NotFound { .. })));
    }

    #[test]
    fn test_put_overwrites_previous_pool() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPoolStore::new(dir.path());
        store.put("bank", &sample()).unwrap();

        let smaller = BuiltPool::from_records(sample().records.into_iter().take(1).collect());
        store.put("bank", &smaller).unwrap();
        assert_eq!(store.get("bank").unwrap().total_questions(), 1);

        let memory = MemoryPoolStore::new();
        memory.put("bank", &sample()).unwrap();
        memory.put("bank", &smaller).unwrap();
        assert_eq!(memory.get("bank").unwrap(), smaller.pool);
    }
}
