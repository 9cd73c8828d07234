// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::matchers::MatchFailure;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Template error: {0}")]
    Template(String),

    #[error("step '{step}' failed: {failure}")]
    StepFailed {
        step: String,
        failure: Box<MatchFailure>,
    },

    #[error("failed to remove scratch directory {path}: {reason}")]
    Cleanup { path: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HarnessError>;
