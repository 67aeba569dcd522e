//! Error types for the game layer.
//!
//! Every variant here is a protocol violation: the caller asked for
//! something the current state does not allow. They are all detected
//! before any network call is made.

use rengo_protocol::{GameId, Mention};

use crate::ProposalId;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("game {0} not found")]
    NotFound(GameId),

    /// A record with this id is already active.
    #[error("game {0} is already active")]
    DuplicateGame(GameId),

    #[error("{0} is not in a game")]
    NotInGame(Mention),

    /// The member is in the game but another member holds the turn.
    #[error("it is not {member}'s turn, {expected} is to play")]
    NotYourTurn { member: Mention, expected: Mention },

    #[error("{member} is already in game {game}")]
    AlreadyInGame { member: Mention, game: GameId },

    #[error("game {0} is over")]
    GameOver(GameId),

    /// Rosters failed validation (empty team, member listed twice).
    #[error("invalid roster: {0}")]
    InvalidRoster(String),

    #[error("challenge {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("challenge {0} already exists")]
    DuplicateProposal(ProposalId),

    #[error("{member} is not part of challenge {proposal}")]
    NotInvited { member: Mention, proposal: ProposalId },

    /// Teams are split evenly, so the member count must be even.
    #[error("there must be an even number of players, got {0}")]
    OddPlayerCount(usize),

    /// Ending a game with a second pass is switched off.
    #[error("ending game {0} by passing twice is not enabled, please play a move")]
    ClosingPassDisabled(GameId),
}
