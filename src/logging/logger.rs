// src/logging/logger.rs

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// 日志文件名（按小时滚动）
pub const LOG_FILE_NAME: &str = "mocktioneer.json";

/// 初始化全局 tracing 日志
///
/// JSON 日志写入 `log_dir` 下按小时滚动的文件，同时输出到 stderr。
/// 日志级别由 `RUST_LOG` 控制，默认 info。返回的 guard 需要保持到进程退出。
pub fn init_tracing(log_dir: &str) -> Result<WorkerGuard, TryInitError> {
    let log_file = rolling::hourly(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    Registry::default()
        .with(filter)
        .with(fmt::layer().json().with_writer(non_blocking))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(guard)
}
