//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("WebSocket path must start with '/'")]
    InvalidSocketPath,

    #[error("Maximum message size must be positive")]
    InvalidMessageSize,

    #[error("Channel capacity must be positive: {0}")]
    InvalidCapacity(&'static str),

    #[error("Synthetic feed interval must be positive: {0}")]
    InvalidInterval(&'static str),
}
