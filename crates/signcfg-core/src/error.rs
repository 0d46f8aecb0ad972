//! Error types for the signcfg core library.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for signing resolution.
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing property '{key}' in {}", .path.display())]
    MissingProperty { key: &'static str, path: PathBuf },

    #[error("Keystore file not found: {}", .0.display())]
    KeystoreNotFound(PathBuf),

    #[error("Invalid properties at line {line}: {message}")]
    InvalidProperties { line: usize, message: String },

    #[error("Keystore error: {0}")]
    Keystore(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for signcfg operations.
pub type Result<T> = std::result::Result<T, SigningError>;
