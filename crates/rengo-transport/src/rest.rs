//! REST client for token grants, challenges, and move counts.

use std::time::Duration;

use rengo_protocol::{ChallengeId, ChallengeTerms, GameId, PlayerId, ProtocolError};
use serde::Deserialize;
use serde_json::json;

use crate::{GameApi, RealtimeAuth, TokenApi, TokenPair, TransportError};

/// Upper bound for a single HTTP request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the game server's REST API.
///
/// Cheap to clone: `reqwest::Client` is a handle to a shared pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct UiConfig {
    user: Option<UiUser>,
    #[serde(default)]
    chat_auth: Option<String>,
    #[serde(default)]
    user_jwt: Option<String>,
}

#[derive(Deserialize)]
struct UiUser {
    id: u64,
    username: String,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Deserialize)]
struct ChallengeResponse {
    challenge: ChallengeId,
    game: GameId,
}

#[derive(Deserialize)]
struct AcceptResponse {
    game: GameId,
}

impl RestClient {
    /// Creates a client for the server at `base_url`
    /// (e.g. `https://online-go.com`).
    pub fn new(
        base_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetches what the realtime endpoint needs to authenticate the token's
    /// account.
    pub async fn realtime_auth(
        &self,
        access_token: &str,
    ) -> Result<RealtimeAuth, TransportError> {
        let config = self.ui_config(access_token).await?.ok_or_else(|| {
            TransportError::Status {
                status: 401,
                body: "access token rejected".into(),
            }
        })?;
        let missing = |field: &str| {
            TransportError::Protocol(ProtocolError::InvalidMessage(format!(
                "ui config is missing {field}"
            )))
        };
        let user = config.user.ok_or_else(|| missing("user"))?;
        Ok(RealtimeAuth {
            chat_auth: config.chat_auth.ok_or_else(|| missing("chat_auth"))?,
            player_id: PlayerId(user.id),
            username: user.username,
            jwt: config.user_jwt.ok_or_else(|| missing("user_jwt"))?,
        })
    }

    /// `GET /api/v1/ui/config`. `Ok(None)` when the token is rejected.
    async fn ui_config(
        &self,
        access_token: &str,
    ) -> Result<Option<UiConfig>, TransportError> {
        let resp = self
            .http
            .get(self.url("/api/v1/ui/config"))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(resp).await);
        }
        Ok(Some(resp.json().await?))
    }

    async fn token_grant(
        &self,
        form: &[(&str, &str)],
    ) -> Result<TokenPair, TransportError> {
        let resp = self
            .http
            .post(self.url("/oauth2/token/"))
            .form(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body: TokenResponse = resp.json().await?;
        Ok(TokenPair {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
        })
    }
}

impl TokenApi for RestClient {
    async fn authorize(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenPair, TransportError> {
        tracing::debug!(username, "requesting password grant");
        self.token_grant(&[
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ])
        .await
    }

    async fn refresh(
        &self,
        username: &str,
        refresh_token: &str,
    ) -> Result<TokenPair, TransportError> {
        tracing::debug!(username, "requesting refresh grant");
        self.token_grant(&[
            ("grant_type", "refresh_token"),
            ("username", username),
            ("refresh_token", refresh_token),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ])
        .await
    }

    async fn validate(
        &self,
        access_token: &str,
    ) -> Result<Option<PlayerId>, TransportError> {
        let config = self.ui_config(access_token).await?;
        Ok(config
            .and_then(|c| c.user)
            .filter(|user| !user.anonymous && user.id != 0)
            .map(|user| PlayerId(user.id)))
    }
}

impl GameApi for RestClient {
    async fn challenge(
        &self,
        access_token: &str,
        target: PlayerId,
        terms: &ChallengeTerms,
    ) -> Result<(ChallengeId, GameId), TransportError> {
        let resp = self
            .http
            .post(self.url(&format!("/api/v1/players/{}/challenge/", target.0)))
            .bearer_auth(access_token)
            .json(&challenge_body(terms))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body: ChallengeResponse = resp.json().await?;
        Ok((body.challenge, body.game))
    }

    async fn accept_challenge(
        &self,
        access_token: &str,
        challenge: ChallengeId,
    ) -> Result<GameId, TransportError> {
        let resp = self
            .http
            .post(self.url(&format!("/api/v1/me/challenges/{}/accept", challenge.0)))
            .bearer_auth(access_token)
            .json(&json!({}))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body: AcceptResponse = resp.json().await?;
        Ok(body.game)
    }

    async fn move_count(&self, game: GameId) -> Result<u32, TransportError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/v1/games/{}/sgf", game.0)))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(count_sgf_moves(&resp.text().await?))
    }
}

/// Counts the move nodes in an SGF record.
///
/// Every node starts with `;` and the first node is the game header, so the
/// move count is one less than the number of `;`. A record with no nodes
/// counts as zero moves.
pub fn count_sgf_moves(sgf: &str) -> u32 {
    let nodes = sgf.bytes().filter(|b| *b == b';').count();
    u32::try_from(nodes.saturating_sub(1)).unwrap_or(u32::MAX)
}

fn challenge_body(terms: &ChallengeTerms) -> serde_json::Value {
    json!({
        "game": {
            "name": terms.name,
            "private": terms.private,
            "rules": terms.rules,
            "ranked": terms.ranked,
            "handicap": terms.handicap,
            "komi_auto": "custom",
            "komi": terms.komi,
            "initial_state": null,
            "speed": "correspondence",
            "time_control": "none",
            "time_control_parameters": {
                "system": "none",
                "speed": "correspondence",
                "time_control": "none",
                "pause_on_weekends": true,
            },
            "pause_on_weekends": true,
            "width": terms.board_size,
            "height": terms.board_size,
            "disable_analysis": false,
        },
        "challenger_color": terms.challenger_color.as_str(),
        "min_ranking": -1000,
        "max_ranking": 1000,
        "initialized": false,
        "aga_ranked": false,
    })
}

async fn status_error(resp: reqwest::Response) -> TransportError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    TransportError::Status { status, body }
}
