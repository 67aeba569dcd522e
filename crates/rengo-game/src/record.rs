//! The per-game record and the turn pointer derived from it.

use std::fmt;

use rengo_protocol::{Action, Color, GameId, Mention};
use serde::Serialize;

use crate::GameError;
use crate::proposal::first_duplicate;

// ---------------------------------------------------------------------------
// TurnPointer
// ---------------------------------------------------------------------------

/// Which seat of which team acts next.
///
/// Never stored. It is computed from the move counter every time:
///
/// ```text
/// team = count % 2            (0 = black, 1 = white)
/// seat = (count / 2) % size(team)
/// ```
///
/// So teams alternate on every move, and within a team the seats rotate
/// once per two moves. With black `[A, B]` and white `[C, D]` the order is
/// A, C, B, D, A, …
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TurnPointer {
    pub color: Color,
    pub seat: usize,
}

impl TurnPointer {
    /// The pointer after `count` moves, for teams of `sizes[0]` (black) and
    /// `sizes[1]` (white) members.
    ///
    /// An empty team is treated as having one seat.
    pub fn at(count: u32, sizes: [usize; 2]) -> Self {
        let team = (count % 2) as usize;
        let size = sizes[team].max(1);
        Self {
            color: Color::from_team(team),
            seat: (count / 2) as usize % size,
        }
    }
}

impl fmt::Display for TurnPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.color, self.seat)
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// The given side resigned.
    Resigned(Color),
    /// Two passes in a row.
    DoublePass,
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resigned(color) => write!(f, "{color} resigned"),
            Self::DoublePass => f.write_str("both sides passed"),
        }
    }
}

/// Lifecycle of an accepted game.
///
/// The phase before this, waiting for every member to accept, is a
/// [`Proposal`](crate::Proposal) and has no record yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Active,
    Ended(Ending),
}

/// What [`GameRecord::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The game goes on; `next` holds the turn.
    Continue { next: TurnPointer },
    /// The game is over. The record should be removed from the table.
    Ended(Ending),
}

// ---------------------------------------------------------------------------
// GameRecord
// ---------------------------------------------------------------------------

/// Everything Rengo tracks about one game on the server.
///
/// Rosters are fixed at creation. The move counter only goes up, and only
/// through [`apply`](Self::apply), which must be called after the server
/// confirmed the action and never before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    id: GameId,
    /// `[black, white]`.
    rosters: [Vec<Mention>; 2],
    moves: u32,
    last_was_pass: bool,
    phase: GamePhase,
}

impl GameRecord {
    /// Creates an active record with no moves played.
    ///
    /// # Errors
    /// [`GameError::InvalidRoster`] if a team is empty or a member is
    /// listed more than once.
    pub fn new(
        id: GameId,
        black: Vec<Mention>,
        white: Vec<Mention>,
    ) -> Result<Self, GameError> {
        for (color, roster) in [(Color::Black, &black), (Color::White, &white)] {
            if roster.is_empty() {
                return Err(GameError::InvalidRoster(format!("{color} team is empty")));
            }
        }
        if let Some(dup) = first_duplicate(black.iter().chain(&white)) {
            return Err(GameError::InvalidRoster(format!(
                "{dup} is listed more than once"
            )));
        }

        Ok(Self {
            id,
            rosters: [black, white],
            moves: 0,
            last_was_pass: false,
            phase: GamePhase::Active,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn roster(&self, color: Color) -> &[Mention] {
        &self.rosters[color.team()]
    }

    /// Both rosters, black first.
    pub fn rosters(&self) -> &[Vec<Mention>; 2] {
        &self.rosters
    }

    /// All members, black team first.
    pub fn members(&self) -> impl Iterator<Item = &Mention> {
        self.rosters.iter().flatten()
    }

    /// The side `member` plays for, if they are in this game.
    pub fn color_of(&self, member: &Mention) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|color| self.roster(*color).contains(member))
    }

    /// Confirmed moves so far, passes included.
    pub fn move_count(&self) -> u32 {
        self.moves
    }

    pub fn last_was_pass(&self) -> bool {
        self.last_was_pass
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Active
    }

    pub fn turn(&self) -> TurnPointer {
        TurnPointer::at(
            self.moves,
            [self.rosters[0].len(), self.rosters[1].len()],
        )
    }

    /// The member at `pointer`.
    pub fn member_at(&self, pointer: TurnPointer) -> &Mention {
        let roster = &self.rosters[pointer.color.team()];
        &roster[pointer.seat % roster.len()]
    }

    /// The only member allowed to act right now.
    pub fn player_in_turn(&self) -> &Mention {
        self.member_at(self.turn())
    }

    /// Checks that `member` may act now, and returns the side they act for.
    ///
    /// Has no side effects; a rejected member can retry forever without
    /// changing anything.
    pub fn authorize(&self, member: &Mention) -> Result<Color, GameError> {
        if !self.is_active() {
            return Err(GameError::GameOver(self.id));
        }
        if self.color_of(member).is_none() {
            return Err(GameError::NotInGame(member.clone()));
        }
        let expected = self.player_in_turn();
        if expected != member {
            return Err(GameError::NotYourTurn {
                member: member.clone(),
                expected: expected.clone(),
            });
        }
        Ok(self.turn().color)
    }

    /// `true` if `action` is a pass that would end the game.
    pub fn is_closing_pass(&self, action: &Action) -> bool {
        matches!(action, Action::Pass) && self.last_was_pass
    }

    /// Records a confirmed action by the side in turn.
    ///
    /// - move: counter + 1, pass flag cleared
    /// - pass: counter + 1, pass flag set; if it was already set the game
    ///   ends by double pass
    /// - resign: the side in turn resigns
    ///
    /// # Errors
    /// [`GameError::GameOver`] if the game already ended. Nothing changes.
    pub fn apply(&mut self, action: &Action) -> Result<Transition, GameError> {
        if !self.is_active() {
            return Err(GameError::GameOver(self.id));
        }
        let color = self.turn().color;

        let ending = match action {
            Action::Play(_) => {
                self.moves += 1;
                self.last_was_pass = false;
                None
            }
            Action::Pass if self.last_was_pass => {
                self.moves += 1;
                Some(Ending::DoublePass)
            }
            Action::Pass => {
                self.moves += 1;
                self.last_was_pass = true;
                None
            }
            Action::Resign => Some(Ending::Resigned(color)),
        };

        match ending {
            Some(ending) => {
                self.end(ending);
                Ok(Transition::Ended(ending))
            }
            None => Ok(Transition::Continue { next: self.turn() }),
        }
    }

    /// Ends the game without an action from the side in turn.
    ///
    /// Used when a game is superseded by a new one for one of its members.
    /// Anyone still holding this record sees [`GameError::GameOver`].
    pub fn end(&mut self, ending: Ending) {
        if self.is_active() {
            tracing::info!(game_id = %self.id, %ending, moves = self.moves, "game ended");
            self.phase = GamePhase::Ended(ending);
        }
    }
}
