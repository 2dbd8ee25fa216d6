/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 上传的题库源文档目录
    pub upload_folder: String,
    /// 解析后的题库存放目录
    pub pool_folder: String,
    /// 生成的试卷输出目录
    pub generated_folder: String,
    /// 组卷请求（TOML）目录
    pub request_folder: String,
    /// 同时解析的文档数量
    pub max_concurrent_documents: usize,
    /// 组卷请求未指定时的默认套数
    pub default_num_sets: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 失败记录文件
    pub warn_file: String,
    // --- 试卷抬头 ---
    pub institution_name: String,
    pub institution_subtitle: String,
    pub exam_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_folder: "uploads".to_string(),
            pool_folder: "uploads/pools".to_string(),
            generated_folder: "generated_papers".to_string(),
            request_folder: "paper_requests".to_string(),
            max_concurrent_documents: 4,
            default_num_sets: 4,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            institution_name: "SIDDHARTH INSTITUTE OF ENGINEERING & TECHNOLOGY:: PUTTUR"
                .to_string(),
            institution_subtitle: "(AUTONOMOUS)".to_string(),
            exam_title:
                "MCA I Year II Semester Regular & Supplementary Examinations June/July-2025"
                    .to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            upload_folder: std::env::var("UPLOAD_FOLDER").unwrap_or(default.upload_folder),
            pool_folder: std::env::var("POOL_FOLDER").unwrap_or(default.pool_folder),
            generated_folder: std::env::var("GENERATED_FOLDER").unwrap_or(default.generated_folder),
            request_folder: std::env::var("REQUEST_FOLDER").unwrap_or(default.request_folder),
            max_concurrent_documents: std::env::var("MAX_CONCURRENT_DOCUMENTS").ok().and_then(|v| v.parse().ok()).filter(|v: &usize| *v > 0).unwrap_or(default.max_concurrent_documents),
            default_num_sets: std::env::var("DEFAULT_NUM_SETS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_num_sets),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            institution_name: std::env::var("INSTITUTION_NAME").unwrap_or(default.institution_name),
            institution_subtitle: std::env::var("INSTITUTION_SUBTITLE").unwrap_or(default.institution_subtitle),
            exam_title: std::env::var("EXAM_TITLE").unwrap_or(default.exam_title),
        }
    }
}
