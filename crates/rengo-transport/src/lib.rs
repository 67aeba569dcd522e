//! Everything Rengo needs from the remote game server.
//!
//! The server exposes two surfaces, and this crate models both as traits so
//! the layers above can be tested against in-memory fakes:
//!
//! - [`TokenApi`]: OAuth-style password/refresh grants and token
//!   validation.
//! - [`GameApi`]: challenges and the authoritative move count (REST).
//! - [`MoveGateway`]: moves, resignations, and stone-removal acceptance
//!   (realtime).
//!
//! # Feature Flags
//!
//! - `rest` (default): [`RestClient`] via `reqwest`
//! - `websocket` (default): [`RealtimeClient`] via `tokio-tungstenite`

mod config;
mod error;
#[cfg(feature = "websocket")]
mod realtime;
#[cfg(feature = "rest")]
mod rest;

pub use config::RealtimeConfig;
pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use realtime::RealtimeClient;
#[cfg(feature = "rest")]
pub use rest::{RestClient, count_sgf_moves};

use std::future::Future;

use rengo_protocol::{ChallengeId, ChallengeTerms, GameId, PlayerId, ServerMove};

/// An access/refresh token pair. The two are always issued and stored
/// together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// What the realtime endpoint needs to bind a connection to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeAuth {
    pub chat_auth: String,
    pub player_id: PlayerId,
    pub username: String,
    pub jwt: String,
}

/// Token grants and validation.
///
/// The application's client id/secret are held by the implementation.
pub trait TokenApi: Send + Sync + 'static {
    /// Password grant. Used once per account at enrollment.
    fn authorize(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<TokenPair, TransportError>> + Send;

    /// Refresh grant. Both tokens are replaced.
    fn refresh(
        &self,
        username: &str,
        refresh_token: &str,
    ) -> impl Future<Output = Result<TokenPair, TransportError>> + Send;

    /// Makes a cheap authenticated call with `access_token`.
    ///
    /// # Returns
    /// - `Ok(Some(id))`: the token is valid and belongs to account `id`
    /// - `Ok(None)`: the server rejected the token
    /// - `Err(_)`: the server could not be asked
    fn validate(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Option<PlayerId>, TransportError>> + Send;
}

/// Challenge creation and game queries.
pub trait GameApi: Send + Sync + 'static {
    /// Challenges `target` on behalf of the token's account.
    ///
    /// Returns the challenge id and the id the game will have once accepted.
    fn challenge(
        &self,
        access_token: &str,
        target: PlayerId,
        terms: &ChallengeTerms,
    ) -> impl Future<Output = Result<(ChallengeId, GameId), TransportError>> + Send;

    /// Accepts a challenge addressed to the token's account.
    fn accept_challenge(
        &self,
        access_token: &str,
        challenge: ChallengeId,
    ) -> impl Future<Output = Result<GameId, TransportError>> + Send;

    /// Number of moves (passes included) the server has recorded.
    fn move_count(
        &self,
        game: GameId,
    ) -> impl Future<Output = Result<u32, TransportError>> + Send;
}

/// Submits in-game actions for an account.
///
/// An `Ok` only means the server acknowledged the call. For moves the
/// server may acknowledge without applying the move, so callers confirm
/// through [`GameApi::move_count`].
pub trait MoveGateway: Send + Sync + 'static {
    /// Subscribes the account to the game. Required before acting in it.
    fn connect_game(
        &self,
        game: GameId,
        player: PlayerId,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn submit_move(
        &self,
        game: GameId,
        player: PlayerId,
        mv: &ServerMove,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn submit_resign(
        &self,
        game: GameId,
        player: PlayerId,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Accepts the proposed dead-stone set (`stones` in server notation,
    /// empty for none).
    fn submit_stone_acceptance(
        &self,
        game: GameId,
        player: PlayerId,
        stones: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
