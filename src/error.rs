use thiserror::Error;

/// Errors surfaced by snapshot loading and configuration.
///
/// The grouping and reconciliation passes themselves are infallible.
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot parsed but is unusable (e.g. not an array of orders)
    #[error("Invalid snapshot {path}: {reason}")]
    InvalidSnapshot { path: String, reason: String },
}
