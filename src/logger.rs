//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// 通过 `RUST_LOG` 控制日志级别，默认 `info`。重复调用时静默忽略。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
