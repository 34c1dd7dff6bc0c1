//! Crate-level error taxonomy.
//!
//! Invalid per-quote data never reaches these types: malformed prices
//! are dropped at the normalizer and insufficient data is a first-class
//! pick state, not an error. Only configuration problems and feed-level
//! fetch failures surface to the caller.

use thiserror::Error;

use crate::domain::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Upstream feed failures: the only caller-visible error during a run.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to read feed snapshot: {0}")]
    Io(#[source] std::io::Error),

    #[error("failed to parse feed snapshot: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("feed unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error for the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
