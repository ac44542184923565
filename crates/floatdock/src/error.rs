#![forbid(unsafe_code)]

//! Error types for the fallible surfaces: configuration loading and
//! explicit id lookups. The event-driven entry points of
//! [`crate::FloatManager`] never fail; they drop and log instead.

use thiserror::Error;

use crate::floater::FloaterId;

/// Errors from loading or validating an [`crate::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The parsed values are out of range.
    #[error("invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Errors from host calls that name a floater directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown floater {0}")]
    UnknownFloater(FloaterId),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
