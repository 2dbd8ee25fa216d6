//! 单个文档 / 单个请求处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **文档提取**：为一份上传的源文档建立上下文，委托 `ExtractionFlow`
//! 2. **组卷请求**：把 TOML 请求转换为组卷规格，委托 `AssemblyFlow`
//! 3. **失败记录**：提取失败的文档写入 warn.txt
//! 4. **统计输出**：记录单个文档 / 单个请求的结果

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

use crate::models::{AssemblyReport, ExtractionSummary, PaperRequest};
use crate::services::WarnWriter;
use crate::workflow::{AssemblyFlow, DocumentCtx, ExtractionFlow};

/// 提取一份源文档，文档ID由上下文给出
pub fn process_document(
    flow: &ExtractionFlow,
    path: &Path,
    ctx: &DocumentCtx,
    warn_writer: &WarnWriter,
) -> Result<ExtractionSummary> {
    log_document_start(ctx, path);

    match flow.extract_file(&ctx.document_id, path) {
        Ok(summary) => {
            log_document_complete(ctx, &summary);
            Ok(summary)
        }
        Err(e) => {
            error!("{} ❌ 提取失败: {}", ctx, e);
            if let Err(warn_err) = warn_writer.write_document(&ctx.document_id, &e.to_string()) {
                warn!("{} 写入 warn.txt 失败: {}", ctx, warn_err);
            }
            Err(e).with_context(|| format!("文档 {} 提取失败", ctx.document_id))
        }
    }
}

/// 处理一个组卷请求
pub fn process_request(
    flow: &AssemblyFlow,
    request: &PaperRequest,
    request_index: usize,
    default_num_sets: usize,
) -> Result<AssemblyReport> {
    log_request_start(request_index, request);

    let spec = request.to_spec(default_num_sets);
    let report = flow
        .assemble(&request.document_id, &spec)
        .with_context(|| format!("文档 {} 组卷失败", request.document_id))?;

    log_request_complete(request_index, &report);
    Ok(report)
}

// ========== 日志辅助函数 ==========

fn log_document_start(ctx: &DocumentCtx, path: &Path) {
    info!("{} 开始提取", ctx);
    info!(
        "{} 文件: {}",
        ctx,
        path.file_name().unwrap_or_default().to_string_lossy()
    );
}

fn log_document_complete(ctx: &DocumentCtx, summary: &ExtractionSummary) {
    for (unit, count) in &summary.unit_counts {
        info!("{} {}: {} 道题", ctx, unit.key(), count);
    }
    info!("{} ✅ 提取完成，共 {} 道题\n", ctx, summary.total_questions);
}

fn log_request_start(request_index: usize, request: &PaperRequest) {
    info!("\n[请求 {}] {}", request_index, "─".repeat(30));
    info!("[请求 {}] 文档: {}", request_index, request.document_id);
    info!("[请求 {}] 科目: {}", request_index, request.subject);
    if let Some(path) = &request.file_path {
        info!("[请求 {}] 文件: {}", request_index, path.display());
    }
}

fn log_request_complete(request_index: usize, report: &AssemblyReport) {
    for variant in &report.variants {
        match variant.output() {
            Some(output) => info!("[请求 {}] {} → {}", request_index, variant.label, output.display()),
            None => warn!("[请求 {}] {} 未生成", request_index, variant.label),
        }
    }
    info!(
        "[请求 {}] ✅ 组卷完成: 成功 {}, 失败 {}\n",
        request_index,
        report.generated_count(),
        report.failed_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::FsPoolStore;
    use crate::services::HeaderText;
    use std::sync::Arc;

    #[test]
    fn test_document_then_request() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("dbms.txt");
        std::fs::write(&source, "UNIT-I\n1. Define DBMS.\n2. Define schema.\n").unwrap();

        let store = Arc::new(FsPoolStore::new(dir.path().join("pools")));
        let warn_writer = WarnWriter::with_path(dir.path().join("warn.txt"));
        let extraction = ExtractionFlow::new(store.clone()).unwrap();
        let ctx = DocumentCtx::from_path(&source, 1);
        let summary = process_document(&extraction, &source, &ctx, &warn_writer).unwrap();
        assert_eq!(summary.document_id, "dbms");

        let assembly = AssemblyFlow::new(
            store,
            dir.path().join("out"),
            HeaderText::default(),
            warn_writer,
        );
        let request: PaperRequest =
            toml::from_str("document_id = \"dbms\"\nnum_sets = 2\nseed = 5\n").unwrap();
        let report = process_request(&assembly, &request, 1, 4).unwrap();
        assert_eq!(report.generated_count(), 2);
        assert!(dir.path().join("out").join("Set_A_5.pdf").exists());
        assert!(dir.path().join("out").join("Set_B_5.pdf").exists());
    }

    #[test]
    fn test_failed_document_is_written_to_warn_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("blank.txt");
        std::fs::write(&source, "   \n").unwrap();

        let warn_writer = WarnWriter::with_path(dir.path().join("warn.txt"));
        let extraction = ExtractionFlow::new(Arc::new(FsPoolStore::new(dir.path()))).unwrap();
        let ctx = DocumentCtx::from_path(&source, 1);
        assert!(process_document(&extraction, &source, &ctx, &warn_writer).is_err());

        let warn = std::fs::read_to_string(dir.path().join("warn.txt")).unwrap();
        assert!(warn.contains("文档 blank"));
    }
}
