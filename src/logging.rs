//! tracing-subscriber setup for binaries and tests that embed the transport.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// The HTTP stack is noisy at debug level
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "h2"];

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Failed to set global tracing subscriber: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Filter used when `RUST_LOG` is not set.
pub fn build_filter_string(default_level: &str) -> String {
    let mut parts = Vec::with_capacity(QUIET_TARGETS.len() + 1);
    parts.push(default_level.to_string());
    parts.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
    parts.join(",")
}

pub fn parse_filter(filter: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(filter).map_err(|source| LoggingError::InvalidFilter {
        filter: filter.to_string(),
        source,
    })
}

pub fn build_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    parse_filter(&build_filter_string(default_level))
}

/// Installs the global subscriber with compact output. Fails if one is already installed.
pub fn init_tracing(default_level: &str) -> Result<(), LoggingError> {
    init_tracing_with_format(default_level, LogFormat::Compact)
}

pub fn init_tracing_with_format(default_level: &str, format: LogFormat) -> Result<(), LoggingError> {
    let filter = build_env_filter(default_level)?;

    match format {
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .compact(),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().flatten_event(true).with_current_span(true));
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
