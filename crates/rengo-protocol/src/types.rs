//! Core identity types shared by every Rengo layer.
//!
//! There are three kinds of "who" in this system, and mixing them up is the
//! easiest bug to write, so each gets its own type:
//!
//! - [`PlayerId`]: an *account* on the game server (one for black, one
//!   for white).
//! - [`Mention`]: a *team member* as the chat front-end identifies them.
//!   Many members share one account.
//! - [`Color`]: which side (and therefore which account) a team plays.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A server-assigned account identifier.
///
/// Newtype wrapper around the server's numeric user id. `#[serde(transparent)]`
/// keeps the JSON representation a plain number, which is what both the
/// server API and the credential file use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A game on the remote server.
///
/// The same id appears in the game's web URL, so `Display` prints the bare
/// number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pending challenge on the remote server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(pub u64);

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A team member, identified the way the chat front-end mentions them
/// (for example `<@1234>`).
///
/// Rengo never interprets the contents; two members are the same member
/// exactly when their mention strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mention(String);

impl Mention {
    /// Wraps a front-end identity string.
    pub fn new(mention: impl Into<String>) -> Self {
        Self(mention.into())
    }

    /// Returns the raw mention string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mention {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// One side of the board.
///
/// Black is always team 0 (the first roster, and the side that moves first);
/// white is team 1. The credential file is keyed by the lowercase name,
/// which is why `rename_all = "lowercase"` is set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Both colors in team order.
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    /// Maps a team index (move counter mod 2) to its color.
    ///
    /// Any odd index is white, any even index is black.
    pub fn from_team(team: usize) -> Self {
        if team % 2 == 0 { Self::Black } else { Self::White }
    }

    /// The team index of this color: 0 for black, 1 for white.
    pub fn team(self) -> usize {
        match self {
            Self::Black => 0,
            Self::White => 1,
        }
    }

    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    /// Lowercase name, as used by the server API and the credential file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChallengeTerms
// ---------------------------------------------------------------------------

/// The fixed ruleset every Rengo game is created with.
///
/// Games are correspondence-paced with no clock: members may take hours
/// between turns. The challenge is always issued by the black account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeTerms {
    /// Game name shown on the server.
    pub name: String,
    /// Rules set name understood by the server (e.g. `"chinese"`).
    pub rules: String,
    pub handicap: u8,
    pub komi: f32,
    /// Board width and height.
    pub board_size: u8,
    pub ranked: bool,
    pub private: bool,
    /// Color of the challenging account.
    pub challenger_color: Color,
}

impl Default for ChallengeTerms {
    fn default() -> Self {
        Self {
            name: "Rengo game".to_string(),
            rules: "chinese".to_string(),
            handicap: 0,
            komi: 7.5,
            board_size: 19,
            ranked: false,
            private: false,
            challenger_color: Color::Black,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
