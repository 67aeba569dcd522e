//! Shared vocabulary for Rengo.
//!
//! This crate defines the "language" every other Rengo crate speaks:
//!
//! - **Types** ([`PlayerId`], [`GameId`], [`Mention`], [`Color`], etc.):
//!   who is playing, in which game, on which side.
//! - **Notation** ([`Coordinate`], [`ServerMove`], [`Action`]): turning a
//!   command like `D4` or `pass` into the two-letter notation the game
//!   server understands.
//! - **Wire frames** ([`ClientFrame`], [`ServerFrame`]): what travels over
//!   the realtime connection.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Protocol (this crate) → Transport (REST + realtime) → Session → Game → rengo
//! ```
//!
//! Nothing in here performs I/O.

mod codec;
mod error;
mod notation;
mod types;
mod wire;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use notation::{Action, Coordinate, ServerMove, BOARD_SIZE};
pub use types::{ChallengeId, ChallengeTerms, Color, GameId, Mention, PlayerId};
pub use wire::{ClientEvent, ClientFrame, ServerFrame};
