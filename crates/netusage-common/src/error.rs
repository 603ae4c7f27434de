//! Error types for netusage

use std::time::Duration;
use thiserror::Error;

/// netusage error type
#[derive(Error, Debug)]
pub enum UsageError {
    /// A platform collaborator (directory or statistics source) failed
    #[error("{source_name} unavailable: {reason}")]
    SourceUnavailable {
        /// Collaborator that failed
        source_name: &'static str,
        /// Failure description
        reason: String,
    },

    /// Statistics source did not answer in time
    #[error("usage source timed out after {0:?}")]
    Timeout(Duration),

    /// Input rejected before doing any work
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Debounced request replaced by a newer one for the same key
    #[error("request superseded by a newer submission")]
    Superseded,

    /// Worker panicked or was cancelled
    #[error("worker aborted: {0}")]
    WorkerAborted(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UsageError {
    /// Subscription directory failure
    pub fn directory(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: "subscription directory",
            reason: reason.into(),
        }
    }

    /// Usage statistics failure
    pub fn stats(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: "usage statistics",
            reason: reason.into(),
        }
    }

    /// True when the failure only means a newer request took over
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Result type for netusage
pub type UsageResult<T> = Result<T, UsageError>;
