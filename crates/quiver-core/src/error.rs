//! Error types for QuiverDB
//!
//! Provides the error taxonomy shared by every stage of the engine, from
//! lexing through plan execution.

use thiserror::Error;

/// The main error type for QuiverDB operations
#[derive(Error, Debug)]
pub enum Error {
    // ========== Compile-time Errors ==========
    #[error("Syntax error at {line}:{column}: {message}")]
    Syntax {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Unknown label or view: {0}")]
    UnknownLabel(String),

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Planning failed: {0}")]
    Plan(String),

    #[error("Unbounded expansion without a safety cap: {0}")]
    UnboundedExpansion(String),

    // ========== Execution Errors ==========
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Execution cancelled")]
    Cancelled,

    // ========== IO Errors ==========
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for QuiverDB operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a syntax error at the given source position
    pub fn syntax(line: u32, column: u32, message: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Returns true if this error is detected before any storage I/O
    pub fn is_compile_time(&self) -> bool {
        matches!(
            self,
            Error::Syntax { .. }
                | Error::UnknownLabel(_)
                | Error::Pattern(_)
                | Error::Plan(_)
                | Error::UnboundedExpansion(_)
        )
    }

    /// Returns true if this error was caused by external cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Returns true if this error was reported by the storage adapter
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}
