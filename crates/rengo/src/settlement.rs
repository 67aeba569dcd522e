//! End-of-game settlement after a closing pass.
//!
//! When the second pass in a row lands, the server computes which stones it
//! thinks are dead and waits for both sides to accept that set. It needs a
//! moment to do so, and it does not like acceptances arriving back to back,
//! so the controller walks through fixed stages with delays in between:
//!
//! ```text
//! AwaitingSettlement ──(settle_delay)──→ Accepting(Black) ──→ Accepting(White) ──→ Done
//!                                          │                    │
//!                            before_accept, accept, after_accept (each)
//! ```
//!
//! A failure in any stage stops the walk. One side may then have accepted
//! and the other not; that state is logged and left for a human.

use std::fmt;
use std::time::Duration;

use rengo_protocol::Color;
use serde::{Deserialize, Serialize};

/// Delays between settlement stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Wait after the closing pass before anything else.
    pub settle_delay: Duration,
    /// Wait before each side's acceptance.
    pub before_accept: Duration,
    /// Wait after each side's acceptance.
    pub after_accept: Duration,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(5),
            before_accept: Duration::from_secs(5),
            after_accept: Duration::from_secs(5),
        }
    }
}

impl SettleConfig {
    /// Sum of all delays in a complete settlement.
    pub fn total(&self) -> Duration {
        self.settle_delay + (self.before_accept + self.after_accept) * 2
    }
}

/// Where a settlement is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleStage {
    AwaitingSettlement,
    Accepting(Color),
    Done,
}

impl SettleStage {
    /// Stages run in strict order: awaiting, black, white, done.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::AwaitingSettlement => Some(Self::Accepting(Color::Black)),
            Self::Accepting(Color::Black) => Some(Self::Accepting(Color::White)),
            Self::Accepting(Color::White) => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub fn is_done(self) -> bool {
        self == Self::Done
    }
}

impl fmt::Display for SettleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingSettlement => f.write_str("awaiting settlement"),
            Self::Accepting(color) => write!(f, "accepting {color}"),
            Self::Done => f.write_str("done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_stage_next_follows_strict_order() {
        let mut stage = SettleStage::AwaitingSettlement;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            seen.push(next);
            stage = next;
        }
        assert_eq!(
            seen,
            vec![
                SettleStage::AwaitingSettlement,
                SettleStage::Accepting(Color::Black),
                SettleStage::Accepting(Color::White),
                SettleStage::Done,
            ]
        );
        assert!(stage.is_done());
    }

    #[test]
    fn test_settle_config_default_is_five_seconds_each() {
        let config = SettleConfig::default();
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert_eq!(config.before_accept, Duration::from_secs(5));
        assert_eq!(config.after_accept, Duration::from_secs(5));
        assert_eq!(config.total(), Duration::from_secs(25));
    }

    #[test]
    fn test_settle_config_missing_fields_use_defaults() {
        let config: SettleConfig =
            serde_json::from_str(r#"{"settle_delay": {"secs": 1, "nanos": 0}}"#).unwrap();
        assert_eq!(config.settle_delay, Duration::from_secs(1));
        assert_eq!(config.after_accept, Duration::from_secs(5));
    }

    #[test]
    fn test_settle_stage_display() {
        assert_eq!(SettleStage::Accepting(Color::Black).to_string(), "accepting black");
        assert_eq!(SettleStage::AwaitingSettlement.to_string(), "awaiting settlement");
    }
}
