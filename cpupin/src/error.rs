//! Error types for pinning plans and domain patching

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PinError {
    #[error("Invalid parameter '{field}': {message}")]
    InvalidParameter {
        field: &'static str,
        message: String,
    },

    #[error("{kind} not found: {}", .path.display())]
    MissingResource { kind: &'static str, path: PathBuf },

    #[error("Malformed {what}: {message}")]
    MalformedInput { what: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PinError>;

impl From<serde_json::Error> for PinError {
    fn from(e: serde_json::Error) -> Self {
        PinError::MalformedInput {
            what: "layout description".to_string(),
            message: e.to_string(),
        }
    }
}

impl PinError {
    /// Create an invalid parameter error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        PinError::InvalidParameter {
            field,
            message: message.into(),
        }
    }

    /// Create a malformed input error.
    pub fn malformed(what: impl Into<String>, message: impl Into<String>) -> Self {
        PinError::MalformedInput {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a missing resource error.
    pub fn missing(kind: &'static str, path: impl Into<PathBuf>) -> Self {
        PinError::MissingResource {
            kind,
            path: path.into(),
        }
    }

    /// Process exit status for a run terminated by this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PinError::InvalidParameter { .. } => 2,
            PinError::MissingResource { .. } => 3,
            PinError::MalformedInput { .. } => 4,
            PinError::Io(_) => 1,
        }
    }
}
