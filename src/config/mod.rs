//! Configuration module for Kibitz
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and reading API credentials from the process environment.
//!
//! # Example
//!
//! ```no_run
//! use kibitz::config::{load_config, Credentials};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("kibitz.toml")).unwrap();
//! let credentials = Credentials::from_env();
//! println!("Fetching {} items per cycle", config.source.page_size);
//! # let _ = credentials;
//! ```

mod credentials;
mod parser;
mod types;
mod validation;

// Re-export types
pub use credentials::{Credentials, OAuthCredentials};
pub use types::{
    AgentConfig, Config, FallbackConfig, FilterConfig, GeneratorConfig, PromptConfig,
    PublishConfig, SourceConfig, SourceKind,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
