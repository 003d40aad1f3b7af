//! Error types for nizam-docs.
//!
//! Library crates use [`DocsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all nizam-docs operations.
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure while talking to the content host.
    #[error("network error: {0}")]
    Network(String),

    /// The content host answered with a non-success status.
    #[error("{url}: HTTP {status}")]
    Status { url: String, status: u16 },

    /// Structured input (catalog JSON, config) could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad manifest, empty path, slug collision, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Markdown rendering or highlighting failure.
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsError>;

impl DocsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a render error from any displayable message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a persistence failure (directory or file write).
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
