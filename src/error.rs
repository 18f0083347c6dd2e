use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("State mismatch: {received} != {expected}")]
    StateMismatch { received: String, expected: String },

    #[error("Cannot parse timestamp {value:?}: {reason}")]
    TimestampParse { value: String, reason: String },

    #[error("Cannot open browser: {0}")]
    Browser(String),

    #[error("Pagination error: {0}")]
    Pagination(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
