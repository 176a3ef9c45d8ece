pub mod call_logger;
pub mod call_summary;

use tracing::subscriber::SetGlobalDefaultError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

pub use call_logger::CallLogger;
pub use call_summary::CallSummary;

/// 初始化全局 tracing 日志：JSON 格式，按小时滚动写入 `log_dir`
///
/// 返回的 guard 需要一直持有，释放时会刷新剩余日志。
pub fn init_tracing(log_dir: &str, file_name: &str) -> Result<WorkerGuard, SetGlobalDefaultError> {
    let log_file = rolling::hourly(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().json().with_writer(non_blocking));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}
