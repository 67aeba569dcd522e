//! Frames exchanged with the game server's realtime endpoint.
//!
//! Every outgoing frame is a named event with a JSON body. Frames that need
//! confirmation carry a `seq`; the server answers those with an `ack` frame
//! echoing the same `seq` (and an `error` string if it refused the call).
//!
//! ```text
//! client → {"seq": 7, "name": "game/move", "data": {"game_id": 1, "player_id": 2, "move": "pd"}}
//! server ← {"type": "ack", "seq": 7}
//! server ← {"type": "ack", "seq": 8, "error": "not your turn"}
//! server ← {"type": "event", "name": "game/1/gamedata"}
//! ```

use serde::{Deserialize, Serialize};

use crate::{GameId, PlayerId};

/// An outgoing frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    /// Set when the sender waits for an acknowledgement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,

    #[serde(flatten)]
    pub event: ClientEvent,
}

/// The events Rengo sends.
///
/// `tag = "name", content = "data"` produces the `{"name": ..., "data": ...}`
/// shape shown in the module docs; the renames are the server's event names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data")]
pub enum ClientEvent {
    /// Binds the connection to an account. Sent once per account at
    /// startup.
    #[serde(rename = "authenticate")]
    Authenticate {
        auth: String,
        player_id: PlayerId,
        username: String,
        jwt: String,
    },

    /// Subscribes an account to a game so it may act in it.
    #[serde(rename = "game/connect")]
    GameConnect {
        game_id: GameId,
        player_id: PlayerId,
        chat: u8,
    },

    /// Plays a move in server notation (`..` for a pass).
    #[serde(rename = "game/move")]
    GameMove {
        game_id: GameId,
        player_id: PlayerId,
        #[serde(rename = "move")]
        mv: String,
    },

    #[serde(rename = "game/resign")]
    GameResign { game_id: GameId, player_id: PlayerId },

    /// Accepts the proposed set of dead stones after two passes.
    #[serde(rename = "game/removed_stones/accept")]
    AcceptRemovedStones {
        game_id: GameId,
        player_id: PlayerId,
        stones: String,
        strict_seki_mode: bool,
    },
}

impl ClientEvent {
    /// The server's name for this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "authenticate",
            Self::GameConnect { .. } => "game/connect",
            Self::GameMove { .. } => "game/move",
            Self::GameResign { .. } => "game/resign",
            Self::AcceptRemovedStones { .. } => "game/removed_stones/accept",
        }
    }
}

/// An incoming frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Answer to a frame that carried `seq`.
    Ack {
        seq: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// A server push Rengo does not act on (game data, clocks, chat).
    Event { name: String },
}
