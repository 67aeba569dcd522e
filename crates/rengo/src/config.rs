//! Settings file.
//!
//! Everything a deployment may want to change lives in one JSON file
//! (conventionally `settings.json`). Missing fields take their defaults, so
//! an old file keeps working when new settings are added.

use std::path::{Path, PathBuf};

use rengo_protocol::ChallengeTerms;
use rengo_transport::RealtimeConfig;
use serde::{Deserialize, Serialize};

use crate::{RengoError, SettleConfig};

/// Where the game server lives and how this application identifies itself
/// to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL for REST calls.
    pub rest_url: String,
    /// Websocket URL for realtime calls. Must be an endpoint that speaks
    /// the sequence/acknowledgement JSON frames of `rengo-protocol` (for
    /// example a relay in front of the game server's own socket). Empty by
    /// default; [`online::connect`](crate::online::connect) refuses to run
    /// without it.
    pub realtime_url: String,
    /// OAuth application id, issued by the server.
    pub client_id: String,
    pub client_secret: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rest_url: "https://online-go.com".into(),
            realtime_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

impl ApiConfig {
    /// `true` once both application credentials are filled in.
    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn has_realtime_url(&self) -> bool {
        !self.realtime_url.trim().is_empty()
    }
}

/// All runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    pub settle: SettleConfig,
    /// Terms every new game is created with.
    pub challenge: ChallengeTerms,
    /// The credential book (`players.json`).
    pub credentials_path: PathBuf,
    /// Whether a second pass in a row ends the game. When off, that pass is
    /// refused and the member is asked to play a move instead.
    pub closing_pass_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            realtime: RealtimeConfig::default(),
            settle: SettleConfig::default(),
            challenge: ChallengeTerms::default(),
            credentials_path: PathBuf::from("players.json"),
            closing_pass_enabled: true,
        }
    }
}

impl Settings {
    /// Reads settings from `path`. `Ok(None)` if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, RengoError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RengoError::Config(format!("{}: {e}", path.display())));
            }
        };
        let settings = serde_json::from_str(&text)
            .map_err(|e| RengoError::Config(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "settings loaded");
        Ok(Some(settings))
    }

    /// Writes the settings to `path` as pretty JSON, replacing the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RengoError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| RengoError::Config(e.to_string()))?;
        std::fs::write(path, text)
            .map_err(|e| RengoError::Config(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(settings.closing_pass_enabled);
        assert_eq!(settings.credentials_path, PathBuf::from("players.json"));
        assert_eq!(settings.challenge.komi, 7.5);
        assert_eq!(settings.challenge.handicap, 0);
        assert!(!settings.api.has_client_credentials());
        assert!(!settings.api.has_realtime_url());
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(dir.path().join("settings.json")).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_returns_same_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.api.client_id = "id".into();
        settings.api.client_secret = "secret".into();
        settings.settle.settle_delay = Duration::from_secs(2);
        settings.closing_pass_enabled = false;

        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap().unwrap();

        assert_eq!(loaded, settings);
        assert!(loaded.api.has_client_credentials());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"api": {"client_id": "abc"}, "closing_pass_enabled": false}"#)
            .unwrap();

        let loaded = Settings::load(&path).unwrap().unwrap();

        assert_eq!(loaded.api.client_id, "abc");
        assert_eq!(loaded.api.rest_url, "https://online-go.com");
        assert!(!loaded.closing_pass_enabled);
        assert_eq!(loaded.realtime, RealtimeConfig::default());
    }

    #[test]
    fn test_load_invalid_json_returns_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let result = Settings::load(&path);

        assert!(matches!(result, Err(RengoError::Config(_))));
    }
}
