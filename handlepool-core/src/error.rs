//! Error types for handlepool operations.

use std::fmt;

use thiserror::Error;

/// Boxed error produced by factories, drivers and handle closes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using handlepool's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during handlepool operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A handle is already registered under this name.
    #[error("handle {0} already exists")]
    AlreadyExists(String),

    /// No handle is registered under this name.
    #[error("handle {0} not found")]
    NotFound(String),

    /// The factory failed to create a handle.
    #[error("failed to create handle {name}: {source}")]
    CreationFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The handle's close operation failed. The name has been evicted anyway.
    #[error("failed to close handle {name}: {source}")]
    CloseFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    /// One or more handles failed to close during a bulk close.
    #[error("failed to close {} handle(s): {}", .0.len(), CloseFailures(.0))]
    CloseAll(Vec<CloseFailure>),

    /// The handle has been closed and can no longer be used.
    #[error("handle is closed")]
    Closed,

    /// A call forwarded to the underlying driver failed.
    #[error("driver error: {0}")]
    Driver(#[source] BoxError),

    /// Names must be non-empty.
    #[error("invalid handle name: {0:?}")]
    InvalidName(String),

    /// Configuration failed validation or parsing.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The creation context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The creation context's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A blocking task backing an async operation failed to complete.
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Returns true for `AlreadyExists`.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists(_))
    }

    /// Returns true for `Closed`.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }
}

/// A single failed close collected by a bulk close.
#[derive(Debug)]
pub struct CloseFailure {
    /// Name the handle was registered under.
    pub name: String,
    /// Error returned by the handle's close.
    pub source: BoxError,
}

impl fmt::Display for CloseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.source)
    }
}

struct CloseFailures<'a>(&'a [CloseFailure]);

impl fmt::Display for CloseFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::AlreadyExists("primary".into());
        assert_eq!(err.to_string(), "handle primary already exists");

        let err = Error::NotFound("replica".into());
        assert_eq!(err.to_string(), "handle replica not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_close_all_lists_every_failure() {
        let err = Error::CloseAll(vec![
            CloseFailure {
                name: "p1".into(),
                source: "connection reset".into(),
            },
            CloseFailure {
                name: "p3".into(),
                source: "timeout".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "failed to close 2 handle(s): p1: connection reset; p3: timeout"
        );
    }

    #[test]
    fn test_creation_failed_keeps_source() {
        use std::error::Error as _;

        let err = Error::CreationFailed {
            name: "x".into(),
            source: "dial tcp: refused".into(),
        };
        assert_eq!(err.source().unwrap().to_string(), "dial tcp: refused");
    }
}
