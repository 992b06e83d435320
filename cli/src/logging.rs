use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes logging for the command line tool.
///
/// Console output is always on. When `log_dir` is given, a JSON log rotated
/// daily is written there as well.
///
/// Default log level is "info", with service and bridge at debug. Override with RUST_LOG:
/// - RUST_LOG=debug questcopy ...
/// - RUST_LOG=remote_bridge=trace questcopy ...
///
/// The returned guard must be kept alive for the duration of the program,
/// dropping it stops file logging.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,service=debug,remote_bridge=debug"));

    let mut guard = None;
    let file_layer = log_dir.and_then(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: Failed to create log directory at {}: {}",
                log_dir.display(),
                e
            );
            return None;
        }

        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "questcopy.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        )
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
