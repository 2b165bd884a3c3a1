// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// An outbound chat-platform call failed or was rejected.
    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Command '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("Command '{0}' not found")]
    CommandNotFound(String),

    /// Raised when a chat has no stored settings. Callers fall back to
    /// `ChatSettings::default()` instead of aborting.
    #[error("Chat {0} has no settings configured")]
    NotConfigured(i64),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Optimistic update kept losing against concurrent writers.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<chrono::format::ParseError> for Error {
    fn from(err: chrono::format::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}
