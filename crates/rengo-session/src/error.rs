//! Error types for the session layer.

use rengo_protocol::Color;
use rengo_transport::TransportError;

/// Errors that can occur while managing account credentials.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server refused to issue or refresh tokens for this account, or
    /// a token turned out to belong to someone else. Not retried.
    #[error("authentication failed for {color} account: {reason}")]
    AuthFailed { color: Color, reason: String },

    /// The server could not be reached to check a token.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No credential is stored for this account.
    #[error("no credential for {0} account")]
    NotFound(Color),

    /// The store holds no credential book yet; run enrollment first.
    #[error("no credentials enrolled")]
    NotEnrolled,

    /// Reading or writing the credential store failed.
    #[error("credential store: {0}")]
    Io(#[from] std::io::Error),

    /// The credential store contents are not a valid book.
    #[error("credential store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
