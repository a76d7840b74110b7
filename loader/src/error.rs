//! Error types for type model loading.
//!
//! Covers I/O and parse failures of model files, duplicate identities across
//! files, and exhausted fallback chains.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or bundling type models.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Two model files describe the same identity.
    #[error("duplicate type identity: {0}")]
    DuplicateType(String),

    /// A model file has neither a JSON nor a YAML extension.
    #[error("unsupported model file extension: {}", .0.display())]
    UnsupportedExtension(PathBuf),

    /// Input paths are missing or empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The loaded model failed structural validation.
    #[error("invalid type model: {0}")]
    Validation(String),

    /// All configured loader sources failed.
    #[error("no type model sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;
