//! Move notation: from what members type to what the server expects.
//!
//! Members write coordinates the way the board UI labels them: a column
//! letter `A`–`T` (there is no `I`) followed by a row number `1`–`19`, with
//! row 19 at the top. The server uses SGF-style notation instead: two
//! lowercase letters, column then row, both counted from `a` at the top-left.
//!
//! ```text
//!   UI     server
//!   A19 →  aa      top-left
//!   T1  →  ss      bottom-right
//!   J10 →  ij      column J is the 9th column, so it becomes `i`
//!   pass → ..
//! ```

use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

/// Board width and height. Only 19×19 games are played.
pub const BOARD_SIZE: u8 = 19;

/// The letter skipped by board column labels.
const SKIPPED_COLUMN: u8 = b'i';

/// Server notation for a pass.
const PASS_NOTATION: &str = "..";

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A validated board intersection.
///
/// Can only be built through [`Coordinate::parse`] (or [`Coordinate::new`]),
/// so holding one means the column and row are on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    /// 0-based column index, left to right (`A` = 0, `J` = 8, `T` = 18).
    column: u8,
    /// 1-based row number, bottom to top.
    row: u8,
}

impl Coordinate {
    /// Builds a coordinate from a 0-based column index and a 1-based row.
    ///
    /// Returns `None` if either is off the board.
    pub fn new(column: u8, row: u8) -> Option<Self> {
        if column < BOARD_SIZE && (1..=BOARD_SIZE).contains(&row) {
            Some(Self { column, row })
        } else {
            None
        }
    }

    /// Parses a UI coordinate such as `D4`, `q16` or `A01`.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidCoordinate`] if the text is not 2–3
    /// characters, the column is not `A`–`T` (or is `I`), or the row is not
    /// a number from 1 to 19.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let invalid = || ProtocolError::InvalidCoordinate(text.to_string());

        let bytes = text.as_bytes();
        if !(2..=3).contains(&bytes.len()) || !text.is_ascii() {
            return Err(invalid());
        }

        let letter = bytes[0].to_ascii_lowercase();
        if !(b'a'..=b't').contains(&letter) || letter == SKIPPED_COLUMN {
            return Err(invalid());
        }
        let mut column = letter - b'a';
        if letter > SKIPPED_COLUMN {
            column -= 1;
        }

        let digits = &text[1..];
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: u8 = digits.parse().map_err(|_| invalid())?;

        Self::new(column, row).ok_or_else(invalid)
    }

    /// 0-based column index, left to right.
    pub fn column(&self) -> u8 {
        self.column
    }

    /// 1-based row number, bottom to top.
    pub fn row(&self) -> u8 {
        self.row
    }

    /// Translates to the server's two-letter notation.
    ///
    /// Column: `a` + column index (the skipped `I` is already folded into
    /// the index). Row: `a` + 19 − row, so the top row is `a`.
    pub fn to_server(&self) -> ServerMove {
        let column = char::from(b'a' + self.column);
        let row = char::from(b'a' + BOARD_SIZE - self.row);
        ServerMove(format!("{column}{row}"))
    }
}

impl fmt::Display for Coordinate {
    /// Prints the UI label, e.g. `D4` or `J10`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letter = b'A' + self.column;
        if letter >= SKIPPED_COLUMN.to_ascii_uppercase() {
            letter += 1;
        }
        write!(f, "{}{}", char::from(letter), self.row)
    }
}

impl FromStr for Coordinate {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// ServerMove
// ---------------------------------------------------------------------------

/// A move in the server's notation: two lowercase letters, or `..` for a
/// pass.
///
/// Only produced by translation ([`Coordinate::to_server`],
/// [`ServerMove::pass`]), never parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerMove(String);

impl ServerMove {
    /// The pass sentinel.
    pub fn pass() -> Self {
        Self(PASS_NOTATION.to_string())
    }

    /// Returns `true` if this is the pass sentinel.
    pub fn is_pass(&self) -> bool {
        self.0 == PASS_NOTATION
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What a member asked to do on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Place a stone.
    Play(Coordinate),
    Pass,
    Resign,
}

impl Action {
    /// Parses the argument of a play command: `pass`, `resign`, or a
    /// coordinate. Command words are case-insensitive.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidAction`] if the text is none of these.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("pass") {
            return Ok(Self::Pass);
        }
        if text.eq_ignore_ascii_case("resign") {
            return Ok(Self::Resign);
        }
        Coordinate::parse(text)
            .map(Self::Play)
            .map_err(|_| ProtocolError::InvalidAction(text.to_string()))
    }

    /// The server notation for this action, if it is a move or pass.
    pub fn server_move(&self) -> Option<ServerMove> {
        match self {
            Self::Play(coord) => Some(coord.to_server()),
            Self::Pass => Some(ServerMove::pass()),
            Self::Resign => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Play(coord) => write!(f, "{coord}"),
            Self::Pass => f.write_str("pass"),
            Self::Resign => f.write_str("resign"),
        }
    }
}

impl FromStr for Action {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// =========================================================================
// Tests
// =========================================================================
