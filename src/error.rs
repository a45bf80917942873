use thiserror::Error;

/// TiltSpot error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TiltError {
    #[error("Sensor helper already running")]
    AlreadyRunning,

    #[error("Sensor helper not running")]
    NotRunning,

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Recording error: {0}")]
    Recording(String),
}

/// Result type for helper and configuration operations
pub type Result<T> = std::result::Result<T, TiltError>;
