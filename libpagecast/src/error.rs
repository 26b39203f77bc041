//! Error types for Pagecast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PagecastError>;

#[derive(Error, Debug)]
pub enum PagecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PagecastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PagecastError::InvalidInput(_) => 3,
            PagecastError::Config(_) => 2,
            PagecastError::Platform(PlatformError::Authentication(_)) => 2,
            PagecastError::Platform(_) => 1,
            PagecastError::Store(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read record {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write record {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to archive record {path}: {source}")]
    Archive {
        path: String,
        source: std::io::Error,
    },

    #[error("Commit failed: {0}")]
    Commit(String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Duplicate content rejected: {0}")]
    Duplicate(String),

    #[error("Timed out waiting for media processing: {0}")]
    Timeout(String),
}
