//! Logging setup for the `hlstream` binary
//!
//! The console filter comes from `HLSTREAM_LOG`, then `RUST_LOG`, then
//! defaults to `warn`. For example:
//! - `HLSTREAM_LOG=hlstream::engine=debug` - one line per highlight pass
//! - `HLSTREAM_LOG=hlstream::stream=trace` - emitter construction and replay
//!
//! A daily rotated file under `<config dir>/logs/` always records debug
//! level. Console output goes to stderr; stdout carries the event stream.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths;

/// Checked before `RUST_LOG`
pub const LOG_ENV: &str = "HLSTREAM_LOG";

const DEFAULT_CONSOLE_DIRECTIVE: &str = "warn";

/// Pick the console filter directive; blank values fall through
fn console_directive(hlstream_log: Option<String>, rust_log: Option<String>) -> String {
    hlstream_log
        .into_iter()
        .chain(rust_log)
        .find(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONSOLE_DIRECTIVE.to_string())
}

fn console_filter() -> EnvFilter {
    let directive = console_directive(std::env::var(LOG_ENV).ok(), std::env::var("RUST_LOG").ok());
    EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Warning: Ignoring invalid log filter {:?}: {}", directive, e);
        EnvFilter::new(DEFAULT_CONSOLE_DIRECTIVE)
    })
}

/// Install the console and file layers
pub fn init() {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(console_filter());

    let file_layer = match config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: Logging already initialized: {}", e);
    }
}
