//! 组卷流程 - 流程层
//!
//! 核心职责：定义"一次组卷请求"的完整流程
//!
//! 流程顺序：
//! 1. 读取题库（不存在 / 为空时报错，绝不生成空白试卷）
//! 2. 确定本次生成的时间戳和套数（越界套数截断到 1..=26）
//! 3. 按 A、B、C ... 顺序逐套选题、渲染、写出
//! 4. 单套失败只记入报告和 warn.txt，不影响其他套

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{AppResult, PoolError};
use crate::infrastructure::{PageSink, PdfCanvas, PoolStore};
use crate::models::{
    AssemblyReport, PaperSpec, SeedSource, VariantLabel, VariantOutcome, VariantStatus,
};
use crate::services::paper_assembler::assemble_seeded;
use crate::services::{HeaderText, PaperRenderer, WarnWriter};

/// 上一次发放的时间戳
static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(0);

/// 单调递增的毫秒时间戳
///
/// 同一毫秒内的两次请求也会拿到不同的值，输出文件名不会相互覆盖。
pub fn next_timestamp() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let previous = LAST_TIMESTAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

/// 组卷流程
pub struct AssemblyFlow {
    store: Arc<dyn PoolStore>,
    output_dir: PathBuf,
    header: HeaderText,
    warn_writer: WarnWriter,
}

impl AssemblyFlow {
    /// 创建新的组卷流程
    pub fn new(
        store: Arc<dyn PoolStore>,
        output_dir: impl Into<PathBuf>,
        header: HeaderText,
        warn_writer: WarnWriter,
    ) -> Self {
        Self {
            store,
            output_dir: output_dir.into(),
            header,
            warn_writer,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 生成 PDF 试卷
    pub fn assemble(&self, document_id: &str, spec: &PaperSpec) -> AppResult<AssemblyReport> {
        self.assemble_with(document_id, spec, |label, path| -> Box<dyn PageSink> {
            Box::new(PdfCanvas::a4(path, label.to_string()))
        })
    }

    /// 使用自定义画布生成试卷
    ///
    /// `make_sink` 为每一套试卷创建一个新画布，参数为套卷标签和输出路径。
    pub fn assemble_with<F>(
        &self,
        document_id: &str,
        spec: &PaperSpec,
        mut make_sink: F,
    ) -> AppResult<AssemblyReport>
    where
        F: FnMut(VariantLabel, &Path) -> Box<dyn PageSink>,
    {
        let pool = self.store.get(document_id)?;
        if pool.is_empty() {
            return Err(PoolError::Empty {
                document_id: document_id.to_string(),
            }
            .into());
        }

        let timestamp = match spec.seed_source {
            SeedSource::Clock => next_timestamp(),
            SeedSource::Fixed(ts) => ts,
        };
        let variant_count = spec.variant_count();
        if variant_count != spec.number_of_variants {
            warn!(
                "⚠️ 请求 {} 套，已调整为 {} 套",
                spec.number_of_variants, variant_count
            );
        }

        info!(
            "[文档 {}] 📝 开始组卷: {} | {} 套 | 时间戳 {}",
            document_id, spec.subject, variant_count, timestamp
        );

        let renderer =
            PaperRenderer::new(self.header.clone().with_exam_title(spec.exam_title.as_deref()));

        let mut variants = Vec::with_capacity(variant_count);
        for label in (0..variant_count).filter_map(VariantLabel::from_index) {
            let paper = assemble_seeded(&pool, label, timestamp);
            let output = self
                .output_dir
                .join(format!("{}.pdf", label.file_stem(timestamp)));

            let mut sink = make_sink(label, &output);
            let status = match renderer.render(&paper, &spec.subject, sink.as_mut()) {
                Ok(()) => {
                    info!("[试卷 {}] ✓ 已生成: {}", label, output.display());
                    VariantStatus::Generated { output }
                }
                Err(e) => {
                    error!("[试卷 {}] ❌ 生成失败: {}", label, e);
                    if let Err(warn_err) =
                        self.warn_writer
                            .write_variant(document_id, label, &e.to_string())
                    {
                        warn!("写入 warn.txt 失败: {}", warn_err);
                    }
                    VariantStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            variants.push(VariantOutcome { label, status });
        }

        let report = AssemblyReport {
            document_id: document_id.to_string(),
            timestamp,
            variants,
        };
        info!(
            "[文档 {}] 组卷完成: 成功 {}, 失败 {}",
            document_id,
            report.generated_count(),
            report.failed_count()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, RenderError};
    use crate::infrastructure::{Font, MemoryPoolStore, RecordingCanvas};
    use crate::models::{BuiltPool, GradingTag, QuestionRecord, SubjectMeta, Unit};

    /// 关闭时总是失败的画布
    struct BrokenCanvas(RecordingCanvas);

    impl PageSink for BrokenCanvas {
        fn page_size(&self) -> (f32, f32) {
            self.0.page_size()
        }
        fn set_font(&mut self, font: Font, size: f32) {
            self.0.set_font(font, size)
        }
        fn font(&self) -> (Font, f32) {
            self.0.font()
        }
        fn draw_text(&mut self, x: f32, y: f32, text: &str) {
            self.0.draw_text(x, y, text)
        }
        fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
            self.0.draw_rect(x, y, width, height)
        }
        fn show_page(&mut self) {
            self.0.show_page()
        }
        fn close(&mut self) -> Result<(), RenderError> {
            Err(RenderError::WriteFailed {
                path: PathBuf::from("full-disk"),
                source: "设备上没有空间".into(),
            })
        }
    }

    fn store_with_questions() -> Arc<MemoryPoolStore> {
        let records = (1..=4)
            .map(|i| QuestionRecord {
                unit: Unit::One,
                serial_number: Some(i),
                question_text: format!("Question {}", i),
                grading_tag: GradingTag::new(2, 1, 12),
            })
            .collect();
        let store = Arc::new(MemoryPoolStore::new());
        store
            .put("bank", &BuiltPool::from_records(records))
            .unwrap();
        store
    }

    fn flow(store: Arc<MemoryPoolStore>, dir: &Path) -> AssemblyFlow {
        AssemblyFlow::new(
            store,
            dir.join("generated"),
            HeaderText::default(),
            WarnWriter::with_path(dir.join("warn.txt")),
        )
    }

    #[test]
    fn test_timestamps_are_strictly_increasing() {
        let mut previous = next_timestamp();
        for _ in 0..1000 {
            let next = next_timestamp();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_missing_and_empty_pools_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryPoolStore::new());
        store.put("empty", &BuiltPool::default()).unwrap();
        let flow = flow(store, dir.path());
        let spec = PaperSpec::new(SubjectMeta::default(), 2);

        let err = flow.assemble("unknown", &spec).unwrap_err();
        assert!(err.is_not_found());

        let err = flow.assemble("empty", &spec).unwrap_err();
        assert!(matches!(err, AppError::Pool(PoolError::Empty { .. })));
    }

    #[test]
    fn test_failed_variant_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let flow = flow(store_with_questions(), dir.path());
        let spec = PaperSpec::new(SubjectMeta::default(), 3).with_seed_source(SeedSource::Fixed(99));

        let report = flow
            .assemble_with("bank", &spec, |label, _| -> Box<dyn PageSink> {
                if label.letter() == 'B' {
                    Box::new(BrokenCanvas(RecordingCanvas::a4()))
                } else {
                    Box::new(RecordingCanvas::a4())
                }
            })
            .unwrap();

        let letters: Vec<char> = report.variants.iter().map(|v| v.label.letter()).collect();
        assert_eq!(letters, vec!['A', 'B', 'C']);
        assert!(report.variants[0].is_generated());
        assert!(!report.variants[1].is_generated());
        assert!(report.variants[2].is_generated());
        assert_eq!(report.timestamp, 99);
        assert_eq!(
            report.variants[2].output().unwrap(),
            &dir.path().join("generated").join("Set_C_99.pdf")
        );

        let warn = std::fs::read_to_string(dir.path().join("warn.txt")).unwrap();
        assert!(warn.contains("文档 bank | Set B"));
    }
}
