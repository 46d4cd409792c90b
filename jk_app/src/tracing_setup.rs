use std::io;

use tracing::Level;
use tracing::Subscriber;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

/// Initialise tracing with non-blocking file appender
pub fn init(app_name: &str, log_dir: &str, default_level: Level) -> WorkerGuard {
    let (non_blocking, guard) = file_writer(app_name, log_dir);

    // Install the subscriber globally
    tracing_subscriber::registry().with(env_filter(default_level)).with(file_layer(non_blocking)).init();

    guard
}

/// Initialise tracing with both file and console output
///
/// The console layer writes to stderr so that command output on stdout
/// stays machine-readable.
pub fn init_with_console(app_name: &str, log_dir: &str, default_level: Level) -> WorkerGuard {
    let (non_blocking, guard) = file_writer(app_name, log_dir);

    // Console layer (with ANSI colors for readability)
    let console_layer = fmt::layer().with_writer(io::stderr).with_target(false).with_ansi(true).compact();

    tracing_subscriber::registry().with(env_filter(default_level)).with(file_layer(non_blocking)).with(console_layer).init();

    guard
}

/// Hourly rolling `{app_name}.log` under `log_dir`, written from a background thread
///
/// Lines still buffered are flushed when the guard drops.
fn file_writer(app_name: &str, log_dir: &str) -> (NonBlocking, WorkerGuard) {
    // Create log directory if it doesn't exist
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::hourly(log_dir, format!("{app_name}.log"));
    tracing_appender::non_blocking(file_appender)
}

/// Respects RUST_LOG env var, falls back to default_level
fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy()
}

fn file_layer<S>(writer: NonBlocking) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(writer)
        .with_target(true) // Include module path
        .with_thread_ids(true) // Requests retry on tokio worker threads
        .with_line_number(true)
        .with_ansi(false) // Disable color codes in files
        .compact()
}

/// Parse a level name from configuration, falling back to `INFO`
pub fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}
