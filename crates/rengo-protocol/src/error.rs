//! Error types for the protocol layer.
//!
//! Each crate in Rengo defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is with the *shape* of some input
//! (a malformed coordinate, an undecodable frame), not with the network
//! or with whose turn it is.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a frame
    /// type we don't know about.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The text is not a board coordinate (`A1`..`T19`, no `I`).
    #[error("invalid coordinate: {0:?}")]
    InvalidCoordinate(String),

    /// The text is neither a coordinate nor one of the command words.
    #[error("invalid action: {0:?}")]
    InvalidAction(String),

    /// The message is invalid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
