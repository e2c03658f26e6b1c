//! Structured logging setup.
//!
//! All log output goes to stderr; stdout is reserved for command
//! payloads (prediction and fit JSON). The filter respects `RUST_LOG`
//! when set, otherwise the `-v` count picks the level for this crate.

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging subsystem. Call once at startup.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dq_core={level}")));

    let use_ansi = std::io::stderr().is_terminal();
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(use_ansi);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
