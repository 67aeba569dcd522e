//! Turn coordination for Rengo games.
//!
//! A Rengo game is an ordinary two-player game on the server, played by two
//! *teams*. The server only ever sees one black and one white account; this
//! crate decides which team member is allowed to act through them next.
//!
//! # Key types
//!
//! - [`GameRecord`]: rosters, move counter, pass flag and phase of one game
//! - [`TurnPointer`]: the (color, seat) in turn, derived from the counter
//! - [`GameTable`]: every active game plus the member-to-game index
//! - [`ChallengeBoard`]: proposed games waiting for every member to accept
//!
//! # Lifecycle
//!
//! ```text
//! ChallengeBoard          GameTable
//! ─────────────           ───────────────────────────────────
//! propose ─→ accept… ─→   insert ─→ Active ─→ apply… ─→ Ended ─→ remove
//!    │                                         (resign / double pass)
//!    └─ decline (cancelled)
//! ```
//!
//! Nothing in here talks to the network. Records only change through
//! [`GameRecord::apply`], which callers invoke after the server confirmed
//! the action.

mod error;
mod proposal;
mod record;
mod table;

pub use error::GameError;
pub use proposal::{Acceptance, ChallengeBoard, Proposal, ProposalId};
pub use record::{Ending, GamePhase, GameRecord, Transition, TurnPointer};
pub use table::{GameTable, SharedRecord};
