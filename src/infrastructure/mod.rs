//! 基础设施层（Infrastructure）
//!
//! 持有文件、画布等资源，只暴露能力，不认识题目或试卷的业务规则。

pub mod canvas;
pub mod font_metrics;
pub mod pdf_canvas;
pub mod pool_store;
pub mod recording_canvas;
pub mod source_reader;

pub use canvas::{PageSink, A4_HEIGHT, A4_WIDTH};
pub use font_metrics::Font;
pub use pdf_canvas::PdfCanvas;
pub use pool_store::{sanitize_document_id, FsPoolStore, MemoryPoolStore, PoolStore};
pub use recording_canvas::{DrawOp, RecordingCanvas};
pub use source_reader::{SourceReader, SourceTextProvider};
