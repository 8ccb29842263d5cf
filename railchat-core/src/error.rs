//! Error types
//!
//! Failures of the chat state model. Nothing here is fatal: every error
//! degrades into a [`Notice`] for the user while prior state is kept.

use thiserror::Error;

/// Errors raised by a key-value backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend could not be reached (no window, storage disabled, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Read or write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored text could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Quota or platform write failure
    #[error("Write rejected: {0}")]
    WriteRejected(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Reasons a submission is refused before anything is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No active project selected.")]
    NoActiveProject,

    #[error("Azure Endpoint or API Key is missing. Please configure in Settings.")]
    MissingCredentials,

    #[error("Please enter a prompt or attach a file.")]
    EmptyPrompt,
}

/// Errors of the submission flow
#[derive(Error, Debug)]
pub enum ChatError {
    /// Rejected before the optimistic update
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The relay answered with a non-2xx status
    #[error("API Error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// Network failure, the request never completed
    #[error("An unexpected error occurred: {0}")]
    Transport(String),

    /// 2xx response whose body is not JSON
    #[error("An unexpected error occurred: malformed response body: {0}")]
    MalformedResponse(String),

    /// An attached file could not be read
    #[error("An unexpected error occurred: could not read {filename}: {reason}")]
    Attachment { filename: String, reason: String },
}

impl ChatError {
    /// User-facing notice for this error
    pub fn notice(&self) -> Notice {
        let level = match self {
            ChatError::Validation(ValidationError::EmptyPrompt) => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        Notice {
            level,
            message: self.to_string(),
        }
    }
}

/// Severity of a transient user notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Transient message shown to the user (toast, stderr line)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
