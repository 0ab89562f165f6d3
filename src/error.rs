use thiserror::Error;

/// Odometer error types
///
/// The navigation math itself is total; these cover loading configuration and track logs.
#[derive(Error, Debug)]
pub enum OdometerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Track log contains no fixes")]
    EmptyTrack,
}

/// Result type for odometer operations
pub type OdoResult<T> = Result<T, OdometerError>;
