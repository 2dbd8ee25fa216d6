pub mod grading_tag;
pub mod loaders;
pub mod paper;
pub mod question;
pub mod report;
pub mod subject;
pub mod unit;

pub use grading_tag::GradingTag;
pub use loaders::{load_all_paper_requests, load_paper_request};
pub use paper::{
    PaperDocument, PaperRequest, PaperSpec, QuestionSlot, SeedSource, UnitSection, VariantLabel,
};
pub use question::{BuiltPool, PoolEntry, QuestionBlock, QuestionPool, QuestionRecord, QuestionRow, RawLine, UnitQuestions};
pub use report::{AssemblyReport, ExtractionSummary, VariantOutcome, VariantStatus};
pub use subject::SubjectMeta;
pub use unit::Unit;
