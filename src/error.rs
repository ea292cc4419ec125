//! Error types for the serialstore facade.
//!
//! Storage operations report [`Error`], shared with every internal crate.
//! Loading a [`StoreConfig`](crate::StoreConfig) reports [`ConfigError`].

use thiserror::Error;

pub use serialstore_core::{Error, Result};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config text is not valid TOML for a store config
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value the store cannot use
    #[error("invalid config: {0}")]
    Invalid(String),
}
