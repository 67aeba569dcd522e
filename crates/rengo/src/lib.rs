//! # Rengo
//!
//! Team Go on a remote game server. Two server accounts (black and white)
//! play an ordinary game; any number of team members take turns driving
//! them, and this crate decides whose turn it is.
//!
//! ## Layers
//!
//! ```text
//! front-end (chat bot, console)
//!     │  propose / accept / play
//!     ▼
//! Coordinator ──── GameTable, ChallengeBoard    (rengo-game)
//!     │  authorized actions
//!     ▼
//! GameController ─ SessionBroker                (rengo-session)
//!     │  REST + realtime calls
//!     ▼
//! TokenApi, GameApi, MoveGateway                (rengo-transport)
//! ```
//!
//! The coordinator only advances a game after the controller reports that
//! the server confirmed the action. Every failure comes back as a
//! [`RengoError`], and [`RengoError::kind`] sorts it into a
//! [`FailureKind`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rengo::prelude::*;
//!
//! # async fn run() -> Result<(), RengoError> {
//! // let settings = Settings::load("settings.json")?.unwrap_or_default();
//! // let coordinator = rengo::online::connect(&settings, broker).await?;
//! // coordinator.propose(ProposalId(1), members).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod controller;
mod coordinator;
mod error;
pub mod online;
mod settlement;
pub mod telemetry;

pub use config::{ApiConfig, Settings};
pub use controller::GameController;
pub use coordinator::{Coordinator, GameStarted, Outcome, PlayReport, TurnView};
pub use error::{FailureKind, RengoError};
pub use settlement::{SettleConfig, SettleStage};

pub use rengo_game::{Ending, GameError, GameRecord, ProposalId, TurnPointer};
pub use rengo_protocol::{Action, ChallengeTerms, Color, Coordinate, GameId, Mention, PlayerId};
pub use rengo_session::{
    CredentialStore, JsonFileStore, Login, MemoryStore, SessionBroker, SessionError,
};
pub use rengo_transport::{RealtimeConfig, TransportError};

/// The types a front-end needs, in one import.
pub mod prelude {
    pub use crate::{
        Action, Color, Coordinator, FailureKind, GameId, GameStarted, Login, Mention, Outcome,
        PlayReport, ProposalId, RengoError, Settings,
    };
}
