//! # Question Paper Generator
//!
//! 从题库文档中提取结构化题目，并按单元随机组出多套 PDF 试卷的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有文件和画布资源，只暴露能力
//! - `SourceReader` - 读取 `.txt` / `.pdf` 源文档文本
//! - `PoolStore` - 题库存取（`FsPoolStore` / `MemoryPoolStore`）
//! - `PdfCanvas` / `RecordingCanvas` - 页面画布
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单份文本 / 单套试卷
//! - `NoiseFilter` - 识别页眉页脚样板行
//! - `BlockSegmenter` - 按单元和题号切分题目块
//! - `MetadataTagger` - 提取评分标记（L / CO / M）
//! - `PoolBuilder` - 构建题库
//! - `paper_assembler` - 按单元随机选题
//! - `PaperRenderer` - 固定版式渲染
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份文档"和"一次组卷请求"的完整处理流程
//! - `ExtractionFlow` - 读取 → 分段 → 标记 → 保存
//! - `AssemblyFlow` - 读取题库 → 选题 → 渲染 → 输出
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理器，管理资源和并发
//! - `orchestrator/document_processor` - 单个文档 / 单个请求处理器
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{FsPoolStore, MemoryPoolStore, PdfCanvas, PoolStore, SourceReader};
pub use models::{
    AssemblyReport, ExtractionSummary, GradingTag, PaperSpec, QuestionPool, QuestionRecord,
    SubjectMeta, Unit, VariantLabel,
};
pub use orchestrator::{App, RunStats};
pub use workflow::{AssemblyFlow, ExtractionFlow};
