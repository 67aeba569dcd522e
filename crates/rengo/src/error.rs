//! Unified error type for Rengo.

use std::fmt;

use rengo_game::GameError;
use rengo_protocol::{GameId, ProtocolError};
use rengo_session::SessionError;
use rengo_transport::TransportError;

use crate::SettleStage;

/// Top-level error that wraps all layer-specific errors.
///
/// The `#[from]` variants let `?` lift errors from the lower crates. The
/// remaining variants are failures only the controller can detect.
#[derive(Debug, thiserror::Error)]
pub enum RengoError {
    /// Malformed input (coordinate, command, frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A remote call failed, timed out, or was refused.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Credentials could not be made fresh, loaded, or saved.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The action is not allowed in the current game state.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The server acknowledged a move but its move count did not go up.
    #[error("game {game}: move was acknowledged but not recorded (count {before} -> {after})")]
    Rejected { game: GameId, before: u32, after: u32 },

    /// Creating or accepting the challenge did not produce the expected game.
    #[error("could not start game: {0}")]
    ChallengeFailed(String),

    /// The end-of-game stone acceptance sequence stopped part way. The
    /// closing pass itself was confirmed, so the game has ended.
    #[error("game {game}: settlement failed while {stage}: {source}")]
    Settlement {
        game: GameId,
        stage: SettleStage,
        #[source]
        source: Box<RengoError>,
    },

    /// Settings file could not be read or written.
    #[error("settings: {0}")]
    Config(String),
}

/// The failure taxonomy callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Token refresh rejected or no usable credential. Not retried.
    Auth,
    /// Network error or timeout. The whole action may be retried later.
    Transport,
    /// The server took the call but did not apply it.
    Rejected,
    /// Out of turn, unknown game, malformed input. Nothing was sent.
    ProtocolViolation,
    /// Local files (settings, credentials) are unreadable.
    Storage,
}

impl RengoError {
    /// Classifies the error. No variant ever leaves game state modified.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Protocol(_) | Self::Game(_) => FailureKind::ProtocolViolation,
            Self::Transport(e) => transport_kind(e),
            Self::Session(e) => match e {
                SessionError::Transport(e) => transport_kind(e),
                SessionError::Io(_) | SessionError::Corrupt(_) => FailureKind::Storage,
                SessionError::AuthFailed { .. }
                | SessionError::NotFound(_)
                | SessionError::NotEnrolled => FailureKind::Auth,
            },
            Self::Rejected { .. } | Self::ChallengeFailed(_) => FailureKind::Rejected,
            Self::Settlement { source, .. } => source.kind(),
            Self::Config(_) => FailureKind::Storage,
        }
    }
}

fn transport_kind(error: &TransportError) -> FailureKind {
    match error {
        TransportError::Refused { .. } => FailureKind::Rejected,
        _ => FailureKind::Transport,
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auth => "auth failure",
            Self::Transport => "transport failure",
            Self::Rejected => "rejected action",
            Self::ProtocolViolation => "protocol violation",
            Self::Storage => "storage failure",
        };
        f.write_str(name)
    }
}
