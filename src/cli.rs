//! 命令行参数

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{PaperRequest, SubjectMeta};

/// 题库提取与随机组卷
#[derive(Parser, Debug)]
#[command(name = "qpgen", version, about = "从题库文档提取题目并随机生成多套试卷")]
pub struct Cli {
    /// 不指定时执行批量模式（run）
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 批量模式：提取上传目录中的全部源文档，再处理全部组卷请求
    Run,
    /// 提取单个源文档（.txt / .pdf）
    Extract {
        /// 源文档路径
        #[arg(long)]
        file: PathBuf,
        /// 文档ID，缺省为文件名
        #[arg(long)]
        id: Option<String>,
    },
    /// 为已提取的题库生成试卷
    Assemble {
        /// 文档ID
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "")]
        subject_name: String,
        #[arg(long, default_value = "")]
        subject_code: String,
        #[arg(long, default_value = "")]
        regulation: String,
        /// 套数（1-26，越界时截断）
        #[arg(long)]
        num_sets: Option<usize>,
        /// 固定时间戳，用于复现
        #[arg(long)]
        seed: Option<i64>,
        /// 覆盖考试名称行
        #[arg(long)]
        exam_title: Option<String>,
    },
}

impl Command {
    /// `assemble` 子命令对应的组卷请求
    pub fn to_request(&self) -> Option<PaperRequest> {
        match self {
            Command::Assemble {
                id,
                subject_name,
                subject_code,
                regulation,
                num_sets,
                seed,
                exam_title,
            } => Some(PaperRequest {
                document_id: id.clone(),
                num_sets: *num_sets,
                seed: *seed,
                exam_title: exam_title.clone(),
                subject: SubjectMeta::new(subject_name, subject_code, regulation),
                file_path: None,
            }),
            _ => None,
        }
    }
}
