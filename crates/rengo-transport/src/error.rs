use std::time::Duration;

use rengo_protocol::ProtocolError;

/// Errors that can occur talking to the game server.
///
/// Every variant means the same thing to the layers above: the call did not
/// demonstrably succeed, so nothing may be mutated.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the connection failed.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// No acknowledgement arrived in time.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The server acknowledged the call with an error.
    #[error("{operation} refused by server: {reason}")]
    Refused {
        operation: &'static str,
        reason: String,
    },

    /// The HTTP request could not be completed.
    #[cfg(feature = "rest")]
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected HTTP status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// A frame or response body could not be encoded/decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
