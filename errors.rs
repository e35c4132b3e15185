// Error types for MemDb
// Every variant's Display text is the message surfaced to callers verbatim

use std::fmt;
use std::io;

use thiserror::Error;

/// Main error type for MemDb operations
#[derive(Debug, Error)]
pub enum MemDbError {
    /// Key was empty, whitespace-only or otherwise unusable
    #[error("Key is not specified")]
    InvalidKey,

    /// No usable backing file
    #[error("Persistent storage is not allowed")]
    StorageUnavailable,

    /// Key has no value in memory
    #[error("Variable does not exist")]
    VariableNotFound { key: String },

    /// Key is absent from the persisted record list (load)
    #[error("Variable could not be located in the file")]
    RecordNotFound { key: String },

    /// Key is absent from the persisted record list (purge)
    #[error("Variable did not exist in the file")]
    NotInFile { key: String },

    /// Key already has a value and overwrite was not requested
    #[error("Variable already exist and override is not allowed")]
    Conflict { key: String },

    /// Backing file holds no document
    #[error("File is empty")]
    EmptyFile,

    /// Backing file holds a malformed document
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    /// I/O operation failed
    #[error("I/O error during {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for MemDb operations
pub type Result<T> = std::result::Result<T, MemDbError>;

/// Helper trait for adding context to io::Errors
pub trait IoContext<T> {
    fn io_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MemDbError::Io {
            context: context.into(),
            source: e,
        })
    }
}

/// Outcome of a persistence operation: a success flag plus a message the
/// caller can show as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub ok: bool,
    pub message: String,
}

impl Status {
    pub fn done(message: impl Into<String>) -> Self {
        Status { ok: true, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Status { ok: false, message: message.into() }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.ok { "ok" } else { "failed" };
        write!(f, "{}: {}", mark, self.message)
    }
}

impl<S: Into<String>> From<Result<S>> for Status {
    fn from(result: Result<S>) -> Self {
        match result {
            Ok(message) => Status::done(message),
            Err(e) => Status::failed(e.to_string()),
        }
    }
}
