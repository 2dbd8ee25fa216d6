//! 批量处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：初始化日志文件，创建题库存储和两个流程
//! 2. **批量提取**：扫描上传目录中的所有源文档（`.txt` / `.pdf`）
//! 3. **并发控制**：使用 Semaphore 限制同时提取的文档数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **组卷请求**：提取完成后依次处理请求目录中的所有 TOML 请求
//! 6. **全局统计**：汇总提取和组卷的结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文档的细节
//! - **并发安全**：提取流程通过 Arc 共享，分段状态只存在于单次调用内
//! - **阻塞隔离**：文件读写和渲染都在 `spawn_blocking` 中执行

use crate::config::Config;
use crate::infrastructure::{FsPoolStore, PoolStore, SourceReader};
use crate::models::{load_all_paper_requests, PaperRequest};
use crate::orchestrator::document_processor;
use crate::services::{HeaderText, WarnWriter};
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_documents_loaded, log_startup,
    print_final_stats, ProcessingStats,
};
use crate::workflow::{AssemblyFlow, DocumentCtx, ExtractionFlow};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 一次运行的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub documents: ProcessingStats,
    pub papers: ProcessingStats,
}

/// 应用主结构
pub struct App {
    config: Config,
    extraction: Arc<ExtractionFlow>,
    assembly: Arc<AssemblyFlow>,
    warn_writer: WarnWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        log_startup(config.max_concurrent_documents);

        let store: Arc<dyn PoolStore> = Arc::new(FsPoolStore::new(&config.pool_folder));
        let warn_writer = WarnWriter::with_path(&config.warn_file);

        let extraction = Arc::new(
            ExtractionFlow::new(store.clone())?.with_verbose_logging(config.verbose_logging),
        );
        let assembly = Arc::new(AssemblyFlow::new(
            store,
            &config.generated_folder,
            HeaderText::from_config(&config),
            warn_writer.clone(),
        ));

        Ok(Self {
            config,
            extraction,
            assembly,
            warn_writer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行应用主逻辑：先提取全部源文档，再处理全部组卷请求
    pub async fn run(&self) -> Result<RunStats> {
        let documents = self.load_documents().await?;
        let document_stats = if documents.is_empty() {
            warn!("⚠️ 上传目录中没有待提取的源文档");
            ProcessingStats::default()
        } else {
            log_documents_loaded(documents.len(), self.config.max_concurrent_documents);
            self.extract_all(documents).await?
        };

        let requests = self.load_requests().await?;
        let paper_stats = if requests.is_empty() {
            warn!("⚠️ 没有找到组卷请求（TOML），跳过组卷");
            ProcessingStats::default()
        } else {
            self.assemble_all(requests).await
        };

        print_final_stats(&document_stats, &paper_stats, &self.config.output_log_file);

        Ok(RunStats {
            documents: document_stats,
            papers: paper_stats,
        })
    }

    /// 提取单个源文件（命令行 `extract` 子命令）
    pub async fn extract_one(&self, path: PathBuf, document_id: Option<String>) -> Result<()> {
        let flow = self.extraction.clone();
        let warn_writer = self.warn_writer.clone();

        tokio::task::spawn_blocking(move || match document_id {
            Some(id) => flow
                .extract_file(&id, &path)
                .map(|summary| info!("✅ {}", summary))
                .map_err(|e| {
                    if let Err(warn_err) = warn_writer.write_document(&id, &e.to_string()) {
                        warn!("写入 warn.txt 失败: {}", warn_err);
                    }
                    anyhow::Error::new(e)
                }),
            None => {
                let ctx = DocumentCtx::from_path(&path, 1);
                document_processor::process_document(&flow, &path, &ctx, &warn_writer).map(|_| ())
            }
        })
        .await?
    }

    /// 处理单个组卷请求（命令行 `assemble` 子命令）
    pub async fn assemble_one(&self, request: PaperRequest) -> Result<()> {
        let flow = self.assembly.clone();
        let default_num_sets = self.config.default_num_sets;

        let report = tokio::task::spawn_blocking(move || {
            document_processor::process_request(&flow, &request, 1, default_num_sets)
        })
        .await??;

        if report.failed_count() > 0 {
            anyhow::bail!(
                "{} 套试卷生成失败，详见 {}",
                report.failed_count(),
                self.config.warn_file
            );
        }
        Ok(())
    }

    /// 扫描上传目录
    async fn load_documents(&self) -> Result<Vec<PathBuf>> {
        info!("\n📁 正在扫描待提取的源文档...");
        let folder = Path::new(&self.config.upload_folder);
        if !folder.exists() {
            warn!("⚠️ 上传目录不存在: {}", folder.display());
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        let mut entries = tokio::fs::read_dir(folder)
            .await
            .with_context(|| format!("无法读取文件夹: {}", folder.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && SourceReader::is_supported(&path) {
                documents.push(path);
            }
        }
        documents.sort();
        Ok(documents)
    }

    /// 加载组卷请求
    async fn load_requests(&self) -> Result<Vec<PaperRequest>> {
        info!("\n📁 正在扫描组卷请求...");
        if !Path::new(&self.config.request_folder).exists() {
            warn!("⚠️ 请求目录不存在: {}", self.config.request_folder);
            return Ok(Vec::new());
        }
        load_all_paper_requests(&self.config.request_folder).await
    }

    /// 分批并发提取所有源文档
    async fn extract_all(&self, documents: Vec<PathBuf>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_documents.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = documents.len();
        let total_batches = total.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        let contexts = DocumentCtx::for_batch(&documents);
        let jobs: Vec<(PathBuf, DocumentCtx)> = documents.into_iter().zip(contexts).collect();

        for (batch_index, batch) in jobs.chunks(batch_size).enumerate() {
            let batch_start = batch_index * batch_size;
            let batch_num = batch_index + 1;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            let batch_stats = self.extract_batch(batch, semaphore.clone()).await?;

            stats.success += batch_stats.success;
            stats.failed += batch_stats.failed;

            log_batch_complete(batch_num, batch_stats.success, batch.len());
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn extract_batch(
        &self,
        batch: &[(PathBuf, DocumentCtx)],
        semaphore: Arc<Semaphore>,
    ) -> Result<ProcessingStats> {
        let mut handles = Vec::new();

        for (path, ctx) in batch {
            let document_index = ctx.document_index;
            let permit = semaphore.clone().acquire_owned().await?;

            let flow = self.extraction.clone();
            let warn_writer = self.warn_writer.clone();
            let path = path.clone();
            let ctx = ctx.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                document_processor::process_document(&flow, &path, &ctx, &warn_writer)
            });
            handles.push((document_index, handle));
        }

        // 等待本批所有任务完成
        let mut result = ProcessingStats {
            total: batch.len(),
            ..Default::default()
        };

        for (document_index, handle) in handles {
            match handle.await {
                Ok(Ok(_)) => result.record(true),
                Ok(Err(_)) => result.record(false),
                Err(e) => {
                    error!("[文档 {}] 任务执行失败: {}", document_index, e);
                    result.record(false);
                }
            }
        }

        Ok(result)
    }

    /// 依次处理所有组卷请求，输出顺序与请求文件顺序一致
    async fn assemble_all(&self, requests: Vec<PaperRequest>) -> ProcessingStats {
        let mut stats = ProcessingStats {
            total: requests.len(),
            ..Default::default()
        };

        for (idx, request) in requests.into_iter().enumerate() {
            let request_index = idx + 1;
            let flow = self.assembly.clone();
            let default_num_sets = self.config.default_num_sets;

            let outcome = tokio::task::spawn_blocking(move || {
                document_processor::process_request(&flow, &request, request_index, default_num_sets)
            })
            .await;

            match outcome {
                Ok(Ok(report)) => stats.record(report.failed_count() == 0),
                Ok(Err(e)) => {
                    error!("[请求 {}] ❌ {:#}", request_index, e);
                    stats.record(false);
                }
                Err(e) => {
                    error!("[请求 {}] 任务执行失败: {}", request_index, e);
                    stats.record(false);
                }
            }
        }

        stats
    }
}
