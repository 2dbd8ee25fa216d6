//! 业务能力层（Services）
//!
//! 每个服务描述"我能做什么"，只处理单份文本 / 单道题 / 单套试卷，
//! 不关心流程顺序，也不持有文件或画布等资源。

pub mod block_finalizer;
pub mod metadata_tagger;
pub mod noise_filter;
pub mod paper_assembler;
pub mod paper_renderer;
pub mod pool_builder;
pub mod segmenter;
pub mod text_wrap;
pub mod warn_writer;

pub use block_finalizer::BlockFinalizer;
pub use metadata_tagger::{MetadataTagger, TagMatch, TagNotation, TaggedText};
pub use noise_filter::NoiseFilter;
pub use paper_assembler::{
    assemble_seeded, assemble_variant, derive_seed, QuestionPicker, SeededPicker, PLACEHOLDER_TEXT,
};
pub use paper_renderer::{HeaderText, PageCursor, PaperRenderer};
pub use pool_builder::PoolBuilder;
pub use segmenter::{BlockSegmenter, LineKind};
pub use text_wrap::wrap_text;
pub use warn_writer::WarnWriter;
