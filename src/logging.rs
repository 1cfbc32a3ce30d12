//! Tracing initialization.
//!
//! Diagnostics go to stderr; the per-article report on stdout is produced by
//! [`output`](crate::output) and is not affected by the log level.

use crate::config::LoggingConfig;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directive for `-v` repetitions, `None` when the config level applies.
pub fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `-v`, which wins over config.
pub fn init_logging(config: &LoggingConfig, verbose: u8) {
    let level = verbosity_level(verbose).unwrap_or(config.level.as_str());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}
