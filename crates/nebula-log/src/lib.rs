//! Structured logging and tracing for the Nebula world generator.
//!
//! Console logging through `tracing-subscriber`, with an optional JSON log
//! file in debug builds. The level comes from `RUST_LOG` or, failing that,
//! from the loaded [`Config`].

use nebula_config::Config;
use std::path::Path;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Filter used when neither `RUST_LOG` nor the config sets a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "nebula-worldgen.log";

/// Installs the global tracing subscriber.
///
/// Console output always; in debug builds with a `log_dir`, a JSON copy is
/// also written to [`LOG_FILE_NAME`] inside it. `RUST_LOG` takes precedence
/// over `config.debug.log_level`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
///
/// # Examples
///
/// ```no_run
/// use nebula_config::Config;
/// use nebula_log::init_logging;
///
/// let config = Config::default();
/// init_logging(None, false, Some(&config)).ok();
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // chunk-gen-N workers
        .with_timer(fmt::time::uptime());

    let file_layer = log_dir
        .filter(|_| debug_build)
        .and_then(|dir| {
            std::fs::create_dir_all(dir).ok()?;
            std::fs::File::create(dir.join(LOG_FILE_NAME)).ok()
        })
        .map(|file| {
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::uptime())
                .json()
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
}

/// Filter directive derived from the config's `debug.log_level`, falling
/// back to [`DEFAULT_FILTER`] when it is missing or empty.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.trim().to_string()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
