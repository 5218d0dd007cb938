//! Error types for RankScout.
//!
//! Library crates use [`RankScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! The first three variants after `Config` are the recoverable kinds: they are
//! caught at the smallest scope (one source, one engine, one page, one store
//! write) and turned into counters and log lines rather than aborting a run.

use std::path::PathBuf;

/// Top-level error type for all RankScout operations.
#[derive(Debug, thiserror::Error)]
pub enum RankScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A suggestion source or search engine could not be reached (network, timeout, HTTP status).
    #[error("source unavailable ({source_id}): {message}")]
    SourceUnavailable { source_id: String, message: String },

    /// A response had an unexpected HTML/JSON shape.
    #[error("parse failure ({context}): {message}")]
    ParseFailure { context: String, message: String },

    /// A persisted store could not be read or written.
    #[error("persistence failure at {path:?}: {message}")]
    Persistence { path: PathBuf, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (invalid keyword, bad descriptor, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RankScoutError>;

impl RankScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a source-unavailable error for the given source/engine id.
    pub fn unavailable(source_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_id: source_id.into(),
            message: msg.into(),
        }
    }

    /// Create a parse failure with a short context label.
    pub fn parse(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ParseFailure {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Create a persistence failure for a store file.
    pub fn persistence(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Persistence {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a run may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::ParseFailure { .. } | Self::Persistence { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = RankScoutError::config("missing site url");
        assert_eq!(err.to_string(), "config error: missing site url");

        let err = RankScoutError::unavailable("baidu-suggest", "timed out");
        assert_eq!(err.to_string(), "source unavailable (baidu-suggest): timed out");

        let err = RankScoutError::parse("sogou jsonp", "no callback wrapper");
        assert!(err.to_string().contains("sogou jsonp"));
    }

    #[test]
    fn recoverable_classification() {
        assert!(RankScoutError::unavailable("google", "HTTP 503").is_recoverable());
        assert!(RankScoutError::parse("bing", "no results").is_recoverable());
        assert!(RankScoutError::persistence("/tmp/x.json", "disk full").is_recoverable());
        assert!(!RankScoutError::config("bad selector").is_recoverable());
        assert!(!RankScoutError::validation("empty keyword").is_recoverable());
    }
}
