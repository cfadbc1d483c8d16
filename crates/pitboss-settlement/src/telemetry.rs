//! Tracing subscriber setup.

use pitboss_types::{LogFormat, LoggingConfig, PitbossError, Result};
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `cfg.level` when set.
///
/// # Errors
/// `Configuration` if the level does not parse or a subscriber is already
/// installed.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.level)
            .map_err(|e| PitbossError::Configuration(format!("log level {:?}: {e}", cfg.level)))?,
    };

    let installed = match cfg.format {
        LogFormat::Json => fmt().json().with_env_filter(filter).try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
    };
    installed.map_err(|e| PitbossError::Configuration(format!("tracing subscriber: {e}")))
}
