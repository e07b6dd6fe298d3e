//! Kibitz: a rate-limit-aware social reply agent
//!
//! This crate implements an agent that fetches candidate posts (platform search or
//! trend listings), filters them for sensitive topics, writes a short reply with a
//! language model, and publishes it while respecting the platform's per-endpoint
//! rate limits.

pub mod config;
pub mod filter;
pub mod gateway;
pub mod generator;
pub mod queue;
pub mod scheduler;

use thiserror::Error;

/// Main error type for Kibitz operations
#[derive(Debug, Error)]
pub enum KibitzError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Failed to load environment file: {0}")]
    EnvFile(String),
}

/// Result type alias for Kibitz operations
pub type Result<T> = std::result::Result<T, KibitzError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use filter::{Category, Classification, ContentFilter};
pub use queue::{CandidateItem, ItemOrigin, PendingQueue};
pub use scheduler::{Agent, TickOutcome, TickReport};
