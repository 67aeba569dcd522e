//! The coordinator: what a front-end talks to.
//!
//! It owns the challenge board and the game table, checks every request
//! against them, hands authorized actions to the [`GameController`], and
//! only then updates the record.
//!
//! # Locking
//!
//! ```text
//! board  ── Mutex<ChallengeBoard>   short critical sections only
//! table  ── Mutex<GameTable>        short critical sections only
//! record ── Mutex<GameRecord>       held for authorize → server calls → apply
//! launch ── Mutex<()>               one game start at a time
//! ```
//!
//! A record lock may be held while taking the table lock, never the other
//! way around. The table lock is never held across a network call.

use rengo_game::{
    Acceptance, ChallengeBoard, Ending, GameError, GameRecord, GameTable, Proposal, ProposalId,
    Transition, TurnPointer,
};
use rengo_protocol::{Action, Color, GameId, Mention};
use rengo_session::CredentialStore;
use rengo_transport::{GameApi, MoveGateway, TokenApi};
use tokio::sync::Mutex;

use crate::{GameController, RengoError};

/// A game that has just been created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStarted {
    pub game_id: GameId,
    /// `[black, white]`.
    pub rosters: [Vec<Mention>; 2],
    /// The member who plays the first move.
    pub first: Mention,
    /// Games that were ended because one of the members was in them.
    pub superseded: Vec<GameId>,
}

/// What happened to the game after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The game goes on and `next` is to play.
    Continue { next: Mention, turn: TurnPointer },
    Ended(Ending),
}

/// Result of a successful [`Coordinator::play`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayReport {
    pub game_id: GameId,
    /// The side the action was played for.
    pub color: Color,
    pub action: Action,
    pub outcome: Outcome,
}

/// Who is to play in a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnView {
    pub game_id: GameId,
    pub turn: TurnPointer,
    pub member: Mention,
    pub move_count: u32,
}

pub struct Coordinator<A, S, M> {
    controller: GameController<A, S, M>,
    board: Mutex<ChallengeBoard>,
    table: Mutex<GameTable>,
    launch: Mutex<()>,
    closing_pass_enabled: bool,
}

impl<A, S, M> Coordinator<A, S, M>
where
    A: TokenApi + GameApi,
    S: CredentialStore,
    M: MoveGateway,
{
    pub fn new(controller: GameController<A, S, M>, closing_pass_enabled: bool) -> Self {
        Self {
            controller,
            board: Mutex::new(ChallengeBoard::new()),
            table: Mutex::new(GameTable::new()),
            launch: Mutex::new(()),
            closing_pass_enabled,
        }
    }

    pub fn controller(&self) -> &GameController<A, S, M> {
        &self.controller
    }

    // -----------------------------------------------------------------
    // Challenges
    // -----------------------------------------------------------------

    /// Opens a challenge for `members`: first half black, second half white.
    ///
    /// Rejected if any member is already in a game.
    pub async fn propose(
        &self,
        id: ProposalId,
        members: Vec<Mention>,
    ) -> Result<Proposal, RengoError> {
        let conflict = self.table.lock().await.conflicts(&members).into_iter().next();
        if let Some((member, game)) = conflict {
            return Err(GameError::AlreadyInGame { member, game }.into());
        }
        let mut board = self.board.lock().await;
        Ok(board.propose(id, members)?.clone())
    }

    /// Records `member`'s acceptance. The last acceptance starts the game.
    ///
    /// Returns `None` while acceptances are still missing. If the game
    /// cannot be started the challenge goes back on the board with its
    /// acceptances, and accepting it again retries.
    pub async fn accept(
        &self,
        id: ProposalId,
        member: &Mention,
    ) -> Result<Option<GameStarted>, RengoError> {
        let acceptance = self.board.lock().await.accept(id, member)?;
        let proposal = match acceptance {
            Acceptance::Pending { .. } => return Ok(None),
            Acceptance::Ready(proposal) => proposal,
        };
        match self.launch(&proposal).await {
            Ok(started) => Ok(Some(started)),
            Err(e) => {
                tracing::warn!(proposal = %id, error = %e, "starting game failed");
                self.board.lock().await.restore(proposal);
                Err(e)
            }
        }
    }

    /// Cancels a challenge. Only invited members may decline.
    pub async fn decline(
        &self,
        id: ProposalId,
        member: &Mention,
    ) -> Result<Proposal, RengoError> {
        Ok(self.board.lock().await.decline(id, member)?)
    }

    /// An open challenge.
    pub async fn proposal(&self, id: ProposalId) -> Option<Proposal> {
        self.board.lock().await.get(id).cloned()
    }

    /// Ends the members' current games, creates the new one on the server,
    /// and registers it.
    async fn launch(&self, proposal: &Proposal) -> Result<GameStarted, RengoError> {
        let _launch = self.launch.lock().await;
        let (black, white) = proposal.rosters();

        let superseded = self.supersede(proposal.members()).await;

        let (Some(black_leader), Some(white_leader)) = (black.first(), white.first()) else {
            return Err(GameError::InvalidRoster("a team is empty".into()).into());
        };
        let game_id = self
            .controller
            .start_game([black_leader, white_leader])
            .await?;

        let record = GameRecord::new(game_id, black, white)?;
        let first = record.player_in_turn().clone();
        let rosters = record.rosters().clone();
        self.table.lock().await.insert(record)?;

        Ok(GameStarted {
            game_id,
            rosters,
            first,
            superseded,
        })
    }

    /// Ends every game one of `members` is in.
    ///
    /// The team of the member found in the game resigns it. The record is
    /// dropped even if the resignation does not go through, since the
    /// member is about to be assigned elsewhere.
    async fn supersede(&self, members: &[Mention]) -> Vec<GameId> {
        let conflicts = self.table.lock().await.conflicts(members);
        let mut ended = Vec::new();

        for (member, game) in conflicts {
            if ended.contains(&game) {
                continue;
            }
            let Some(shared) = self.table.lock().await.get(game) else {
                continue;
            };
            let mut record = shared.lock().await;
            if record.is_active() {
                let color = record.color_of(&member).unwrap_or(Color::Black);
                tracing::info!(game_id = %game, %member, %color, "superseding game");
                if let Err(e) = self.controller.resign(game, color).await {
                    tracing::warn!(game_id = %game, error = %e, "resigning superseded game failed");
                }
                record.end(Ending::Resigned(color));
            }
            self.table.lock().await.remove(game);
            ended.push(game);
        }
        ended
    }

    // -----------------------------------------------------------------
    // Playing
    // -----------------------------------------------------------------

    /// Plays `action` for `member` in their current game.
    ///
    /// The game's record stays locked from the turn check until it has
    /// been updated, so concurrent requests for the same game are handled
    /// one after the other. The record changes only if the server confirmed
    /// the action.
    ///
    /// A [`RengoError::Settlement`] error means the closing pass went
    /// through and the game has already been ended and removed; only the
    /// stone acceptance afterwards is incomplete.
    pub async fn play(
        &self,
        member: &Mention,
        action: Action,
    ) -> Result<PlayReport, RengoError> {
        let (game_id, shared) = self.table.lock().await.record_of(member)?;
        let mut record = shared.lock().await;

        let color = record.authorize(member)?;
        let closing = record.is_closing_pass(&action);
        if closing && !self.closing_pass_enabled {
            return Err(GameError::ClosingPassDisabled(game_id).into());
        }

        let executed = match action {
            Action::Play(coordinate) => self.controller.make_move(game_id, color, coordinate).await,
            Action::Pass => self.controller.pass_move(game_id, color, closing).await,
            Action::Resign => self.controller.resign(game_id, color).await,
        };
        match executed {
            Ok(()) => {}
            // The closing pass was confirmed before stone acceptance began,
            // so the game is over on the server either way.
            Err(e @ RengoError::Settlement { .. }) => {
                record.apply(&action)?;
                self.table.lock().await.remove(game_id);
                tracing::warn!(game_id = %game_id, error = %e, "game ended with settlement incomplete");
                return Err(e);
            }
            Err(e) => return Err(e),
        }

        let outcome = match record.apply(&action)? {
            Transition::Continue { next } => Outcome::Continue {
                next: record.member_at(next).clone(),
                turn: next,
            },
            Transition::Ended(ending) => {
                self.table.lock().await.remove(game_id);
                Outcome::Ended(ending)
            }
        };
        tracing::info!(game_id = %game_id, %member, %color, %action, "action accepted");

        Ok(PlayReport {
            game_id,
            color,
            action,
            outcome,
        })
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Who is to play in `game`.
    pub async fn turn(&self, game: GameId) -> Result<TurnView, RengoError> {
        let shared = self
            .table
            .lock()
            .await
            .get(game)
            .ok_or(GameError::NotFound(game))?;
        let record = shared.lock().await;
        if !record.is_active() {
            return Err(GameError::GameOver(game).into());
        }
        Ok(TurnView {
            game_id: game,
            turn: record.turn(),
            member: record.player_in_turn().clone(),
            move_count: record.move_count(),
        })
    }

    /// Who is to play in the game `member` is in.
    pub async fn turn_of(&self, member: &Mention) -> Result<TurnView, RengoError> {
        let game = self
            .game_of(member)
            .await
            .ok_or_else(|| GameError::NotInGame(member.clone()))?;
        self.turn(game).await
    }

    pub async fn game_of(&self, member: &Mention) -> Option<GameId> {
        self.table.lock().await.game_of(member)
    }

    /// A copy of the record of an active game.
    pub async fn record(&self, game: GameId) -> Option<GameRecord> {
        let shared = self.table.lock().await.get(game)?;
        let record = shared.lock().await;
        Some(record.clone())
    }

    /// Ids of all active games, ascending.
    pub async fn games(&self) -> Vec<GameId> {
        self.table.lock().await.game_ids()
    }
}
