//! 流程层（Workflow）
//!
//! - `ExtractionFlow`：一份源文档 → 题库（读取 → 分段 → 标记 → 保存）
//! - `AssemblyFlow`：一次组卷请求 → 多套试卷（读取题库 → 选题 → 渲染 → 输出）
//! - `DocumentCtx`：日志用的文档上下文

pub mod assembly_flow;
pub mod document_ctx;
pub mod extraction_flow;

pub use assembly_flow::{next_timestamp, AssemblyFlow};
pub use document_ctx::DocumentCtx;
pub use extraction_flow::ExtractionFlow;
