//! Error types for repository migration.

use thiserror::Error;

/// The main error type for migration operations.
#[derive(Error, Debug)]
pub enum MoverError {
    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("Required tool '{tool}' is not installed or not on PATH")]
    ToolMissing { tool: String },

    #[error("{method} {path} returned HTTP {status}: {body}")]
    Api {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Clone failed for {repo}: {message}")]
    CloneFailure { repo: String, message: String },
}

impl MoverError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status carried by an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is an API error with the given status code.
    pub fn is_status(&self, code: u16) -> bool {
        self.status() == Some(code)
    }
}

/// A specialized Result type for migration operations.
pub type Result<T> = std::result::Result<T, MoverError>;

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    InvalidArguments,
    ToolMissing,
    CloneFailed,
    MetadataFailed,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::InvalidArguments => 1,
            Self::ToolMissing => 2,
            Self::CloneFailed => 3,
            Self::MetadataFailed => 4,
        }
    }
}

impl From<&MoverError> for ExitStatus {
    /// Status for an error raised while setting up a run.
    fn from(err: &MoverError) -> Self {
        match err {
            MoverError::ToolMissing { .. } => Self::ToolMissing,
            MoverError::CloneFailure { .. } => Self::CloneFailed,
            _ => Self::InvalidArguments,
        }
    }
}
