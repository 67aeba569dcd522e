//! The game lifecycle controller: every call Rengo makes to the server for
//! a game goes through here.
//!
//! The controller knows nothing about turns or members. It is told which
//! color acts in which game, refreshes that account's tokens, makes the
//! calls, and reports whether the server really did what was asked.

use std::sync::Arc;

use rengo_protocol::{ChallengeTerms, Color, Coordinate, GameId, Mention, ServerMove};
use rengo_session::{CredentialStore, SessionBroker};
use rengo_transport::{GameApi, MoveGateway, TokenApi};

use crate::{RengoError, SettleConfig, SettleStage};

/// Drives games on the server on behalf of the two accounts.
///
/// `A` is the REST side (tokens, challenges, move counts), `S` the
/// credential store, `M` the realtime side (moves, resignations, stone
/// acceptance).
pub struct GameController<A, S, M> {
    broker: SessionBroker<A, S>,
    gateway: Arc<M>,
    terms: ChallengeTerms,
    settle: SettleConfig,
}

impl<A, S, M> GameController<A, S, M>
where
    A: TokenApi + GameApi,
    S: CredentialStore,
    M: MoveGateway,
{
    pub fn new(
        broker: SessionBroker<A, S>,
        gateway: Arc<M>,
        terms: ChallengeTerms,
        settle: SettleConfig,
    ) -> Self {
        Self {
            broker,
            gateway,
            terms,
            settle,
        }
    }

    pub fn broker(&self) -> &SessionBroker<A, S> {
        &self.broker
    }

    pub fn terms(&self) -> &ChallengeTerms {
        &self.terms
    }

    fn api(&self) -> &A {
        self.broker.api()
    }

    /// Creates a game between the two accounts and connects both to it.
    ///
    /// The black account challenges the white account, the white account
    /// accepts. `leaders` (black, white) only label the log lines; the
    /// server never sees members.
    ///
    /// # Errors
    /// [`RengoError::ChallengeFailed`] if the accepted game is not the one
    /// that was challenged. Token and transport errors as usual.
    pub async fn start_game(&self, leaders: [&Mention; 2]) -> Result<GameId, RengoError> {
        let black_token = self.broker.ensure_fresh(Color::Black).await?;
        let white_token = self.broker.ensure_fresh(Color::White).await?;
        let white_id = self.broker.player_id(Color::White).await?;

        let (challenge, game) = self
            .api()
            .challenge(&black_token, white_id, &self.terms)
            .await?;
        tracing::debug!(%challenge, game_id = %game, "challenge issued");

        let accepted = self.api().accept_challenge(&white_token, challenge).await?;
        if accepted != game {
            tracing::warn!(%challenge, expected = %game, %accepted, "accepted unexpected game");
            return Err(RengoError::ChallengeFailed(format!(
                "challenge {challenge} was for game {game} but accepting it returned game {accepted}"
            )));
        }

        for color in Color::ALL {
            let player = self.broker.player_id(color).await?;
            self.gateway.connect_game(game, player).await?;
        }

        tracing::info!(
            game_id = %game,
            black = %leaders[0],
            white = %leaders[1],
            "game started"
        );
        Ok(game)
    }

    /// Plays a stone for `color` and confirms the server recorded it.
    pub async fn make_move(
        &self,
        game: GameId,
        color: Color,
        coordinate: Coordinate,
    ) -> Result<(), RengoError> {
        self.submit_confirmed(game, color, &coordinate.to_server())
            .await
    }

    /// Passes for `color`.
    ///
    /// A closing pass (the second in a row) ends the game on the server,
    /// after which both sides accept the removed-stone set. See
    /// [`SettleStage`] for the sequence.
    pub async fn pass_move(
        &self,
        game: GameId,
        color: Color,
        is_closing: bool,
    ) -> Result<(), RengoError> {
        self.submit_confirmed(game, color, &ServerMove::pass()).await?;
        if is_closing {
            self.settle(game).await?;
        }
        Ok(())
    }

    pub async fn resign(&self, game: GameId, color: Color) -> Result<(), RengoError> {
        self.broker.ensure_fresh(color).await?;
        let player = self.broker.player_id(color).await?;
        self.gateway.submit_resign(game, player).await?;
        tracing::info!(game_id = %game, %color, "resigned");
        Ok(())
    }

    /// Submits a move or pass and checks the authoritative move count.
    ///
    /// The realtime endpoint may acknowledge a move it then ignores, so the
    /// acknowledgement alone is not trusted: the count must go up.
    async fn submit_confirmed(
        &self,
        game: GameId,
        color: Color,
        mv: &ServerMove,
    ) -> Result<(), RengoError> {
        self.broker.ensure_fresh(color).await?;
        let player = self.broker.player_id(color).await?;

        let before = self.api().move_count(game).await?;
        self.gateway.submit_move(game, player, mv).await?;
        let after = self.api().move_count(game).await?;

        if after <= before {
            tracing::warn!(game_id = %game, %color, %mv, before, after, "move not recorded");
            return Err(RengoError::Rejected {
                game,
                before,
                after,
            });
        }
        tracing::debug!(game_id = %game, %color, %mv, moves = after, "move confirmed");
        Ok(())
    }

    /// Walks the settlement stages for a game that just ended by passes.
    async fn settle(&self, game: GameId) -> Result<(), RengoError> {
        let mut stage = SettleStage::AwaitingSettlement;
        let mut accepted = Vec::with_capacity(2);

        loop {
            tracing::debug!(game_id = %game, %stage, "settlement stage");
            match stage {
                SettleStage::AwaitingSettlement => {
                    tokio::time::sleep(self.settle.settle_delay).await;
                }
                SettleStage::Accepting(color) => {
                    tokio::time::sleep(self.settle.before_accept).await;
                    if let Err(source) = self.accept_removed_stones(game, color).await {
                        if !accepted.is_empty() {
                            tracing::warn!(
                                game_id = %game,
                                accepted = ?accepted,
                                failed = %color,
                                "settlement left half done"
                            );
                        }
                        return Err(RengoError::Settlement {
                            game,
                            stage,
                            source: Box::new(source),
                        });
                    }
                    accepted.push(color);
                    tokio::time::sleep(self.settle.after_accept).await;
                }
                SettleStage::Done => break,
            }
            let Some(next) = stage.next() else { break };
            stage = next;
        }

        tracing::info!(game_id = %game, "settlement complete");
        Ok(())
    }

    async fn accept_removed_stones(&self, game: GameId, color: Color) -> Result<(), RengoError> {
        self.broker.ensure_fresh(color).await?;
        let player = self.broker.player_id(color).await?;
        self.gateway.submit_stone_acceptance(game, player, "").await?;
        Ok(())
    }
}
