//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量处理器
//! - 管理应用生命周期（初始化、运行）
//! - 扫描上传目录和请求目录
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `document_processor` - 单个文档 / 单个请求处理器
//! - 为源文档建立上下文并委托提取流程
//! - 把组卷请求转换为组卷规格并委托组卷流程
//! - 输出单个文档 / 请求的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<文档> / Vec<请求>)
//!     ↓
//! document_processor (处理单个文档 / 请求)
//!     ↓
//! workflow::{ExtractionFlow, AssemblyFlow}
//!     ↓
//! services (能力层：分段 / 标记 / 组卷 / 渲染 / warn)
//!     ↓
//! infrastructure (基础设施：PdfCanvas / PoolStore / SourceReader)
//! ```

pub mod batch_processor;
pub mod document_processor;

// 重新导出主要类型
pub use batch_processor::{App, RunStats};
pub use document_processor::{process_document, process_request};
