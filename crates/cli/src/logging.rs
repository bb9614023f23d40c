//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup. Logs go to stderr so that stdout stays
//! clean for reports and JSON.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise `level` is used.
pub(crate) fn init(level: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            parse_level(level)?;
            EnvFilter::try_new(level).map_err(|e| format!("invalid log level '{level}': {e}"))
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("failed to set subscriber: {e}"))
}

/// Parse a log level string, rejecting unrecognised values.
pub(crate) fn parse_level(level: &str) -> Result<LevelFilter, String> {
    if level.is_empty() {
        return Err("log level must not be empty".into());
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| format!("unrecognised log level: '{level}'"))
}
