//! Realtime client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long the realtime client waits for acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Bound for calls whose outcome must be confirmed (moves, stone
    /// acceptance).
    pub ack_timeout: Duration,

    /// Bound for fire-and-forget calls (resignation).
    pub quick_timeout: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_secs(15),
            quick_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_config_default() {
        let config = RealtimeConfig::default();
        assert_eq!(config.ack_timeout, Duration::from_secs(15));
        assert_eq!(config.quick_timeout, Duration::from_secs(5));
        assert!(config.quick_timeout < config.ack_timeout);
    }
}
