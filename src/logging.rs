//! Tracing subscriber setup for the command line tool.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity at and above which debug events are shown.
pub const DEBUG_VERBOSITY: u8 = 6;

/// Returns the default filter directive for a `-v` level.
pub fn default_directive(verbosity: u8) -> &'static str {
    if verbosity >= DEBUG_VERBOSITY {
        "debug"
    } else {
        "info"
    }
}

/// Installs a subscriber writing compact events to stderr. `RUST_LOG` overrides the level
/// chosen by `verbosity`.
pub fn init(verbosity: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive(verbosity)))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
