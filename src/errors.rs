use std::time::Duration;

use telnet_sequence::SequenceError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by session operations
///
/// Nothing is retried internally; every failure goes straight back to the
/// caller of the operation that hit it.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An await deadline passed without a match. `received` is everything
    /// still buffered, which stays in the session for the next operation.
    #[error(
        "timed out after {}ms waiting for {expected}; received: {}",
        .elapsed.as_millis(),
        String::from_utf8_lossy(.received)
    )]
    Timeout {
        expected: String,
        received: Vec<u8>,
        elapsed: Duration,
    },

    /// Socket connect, read or write failure
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// The remote closed the connection while a match was pending
    #[error("connection closed by remote; received: {}", String::from_utf8_lossy(.received))]
    ConnectionClosed { received: Vec<u8> },

    /// Matched bytes could not be decoded as telnet sequences
    #[error("malformed telnet sequence: {0}")]
    Malformed(#[from] SequenceError),

    /// `await_pattern` was called without a pattern on a session that has
    /// no prompt pattern
    #[error("no prompt pattern configured")]
    NoPromptPattern,

    /// Prompt pattern does not compile
    #[error("invalid prompt pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SessionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }

    /// Buffered bytes carried by timeout and close errors
    pub fn received(&self) -> Option<&[u8]> {
        match self {
            SessionError::Timeout { received, .. } | SessionError::ConnectionClosed { received } => {
                Some(received)
            }
            _ => None,
        }
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
