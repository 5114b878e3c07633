//! Domain errors for objective synchronization.

use thiserror::Error;

/// Errors raised at the boundaries of the synchronization core.
///
/// None of these are fatal: the periodic tasks log them and retry on the
/// next tick, and optimistic writes roll back on them.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Remote returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Objective not found on remote: {0}")]
    ObjectiveNotFound(String),

    #[error("No representation resolvable for objective: {0}")]
    NoRepresentation(String),

    #[error("Optimistic write for {name} rejected: {reason}")]
    OptimisticWriteRejected { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// True for network and non-2xx failures.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus { .. })
    }

    /// True when the remote answered but the body could not be decoded.
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
