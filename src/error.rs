use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 源文档相关错误
    #[error("源文档错误: {0}")]
    Source(#[from] SourceError),
    /// 题库（题目池）存取错误
    #[error("题库错误: {0}")]
    Pool(#[from] PoolError),
    /// 正则表达式编译失败
    #[error("正则表达式错误: {0}")]
    Pattern(#[from] regex::Error),
}

/// 源文档错误
#[derive(Debug, Error)]
pub enum SourceError {
    /// 文件不存在
    #[error("源文档不存在: {}", path.display())]
    NotFound { path: PathBuf },
    /// 读取失败
    #[error("读取源文档失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// PDF 解码失败
    #[error("解析源文档失败 ({}): {source}", path.display())]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 不支持的文件格式
    #[error("不支持的源文档格式: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    /// 提取出的文本为空
    #[error("文档 {document_id} 的文本为空")]
    EmptyText { document_id: String },
}

/// 题库存取错误
#[derive(Debug, Error)]
pub enum PoolError {
    /// 题库不存在
    #[error("题库不存在: {document_id}")]
    NotFound { document_id: String },
    /// 题库中没有任何题目
    #[error("题库为空: {document_id}")]
    Empty { document_id: String },
    /// 文档ID无效
    #[error("无效的文档ID: '{document_id}'")]
    InvalidDocumentId { document_id: String },
    /// 读取失败
    #[error("读取题库失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("写入题库失败 ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// CSV 表格解析/序列化失败
    #[error("题库表格处理失败 ({}): {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// JSON 解析/序列化失败
    #[error("题库JSON处理失败 ({}): {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 试卷渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// PDF 内容编码失败
    #[error("生成PDF内容失败 ({variant}): {source}")]
    Pdf {
        variant: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写出文件失败
    #[error("写入试卷文件失败 ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 画布已关闭
    #[error("画布已关闭，无法继续绘制")]
    CanvasClosed,
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 是否为"未找到"类错误（源文档或题库缺失）
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::Pool(PoolError::NotFound { .. }) | AppError::Source(SourceError::NotFound { .. })
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
