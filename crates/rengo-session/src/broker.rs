//! The session broker: hands out access tokens that are known to work.
//!
//! Correspondence games move slowly. Hours can pass between two moves of
//! the same account, long enough for its access token to expire. So before
//! every authenticated action the caller asks the broker for a token, and
//! the broker checks it first:
//!
//! ```text
//! ensure_fresh(color)
//!     │
//!     ├─ validate(access) ── valid ──────────────────→ return access
//!     │
//!     └─ invalid ─→ refresh(refresh) ─→ store both ─→ persist ─→ return new access
//!                        │
//!                        └─ error ─→ AuthFailed (no retry)
//! ```
//!
//! # Concurrency
//!
//! Each account has its own gate (an async mutex). Two actions for the same
//! account check and refresh one after the other, so the second sees the
//! token the first one stored instead of spending the refresh token twice.
//! Different accounts never wait on each other's gate.
//!
//! The credential book itself sits behind a separate mutex that is held
//! while the book is written out, which keeps saves in order.

use std::sync::Arc;

use rengo_protocol::{Color, PlayerId};
use rengo_transport::TokenApi;
use tokio::sync::Mutex;

use crate::{CredentialBook, CredentialStore, PlayerCredential, SessionError};

/// Username and password for one account, used only at enrollment.
#[derive(Clone)]
pub struct Login {
    pub username: String,
    pub password: String,
}

impl Login {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Owns the credential book and keeps its tokens fresh.
///
/// Generic over the token API (`T`) and the store (`S`) so tests can swap
/// in fakes for both.
pub struct SessionBroker<T, S> {
    api: Arc<T>,
    store: S,
    book: Mutex<CredentialBook>,
    /// One gate per account, indexed by [`Color::team`].
    gates: [Mutex<()>; 2],
}

impl<T: TokenApi, S: CredentialStore> SessionBroker<T, S> {
    /// Wraps an already-loaded book.
    pub fn new(api: Arc<T>, store: S, book: CredentialBook) -> Self {
        Self {
            api,
            store,
            book: Mutex::new(book),
            gates: [Mutex::new(()), Mutex::new(())],
        }
    }

    /// Loads the book from `store`.
    ///
    /// # Errors
    /// [`SessionError::NotEnrolled`] if the store is empty.
    pub fn open(api: Arc<T>, store: S) -> Result<Self, SessionError> {
        let book = store
            .load()?
            .filter(|book| !book.is_empty())
            .ok_or(SessionError::NotEnrolled)?;
        tracing::info!(accounts = book.len(), "credential book loaded");
        Ok(Self::new(api, store, book))
    }

    /// First-run setup: trades each login for a token pair, looks up the
    /// account id, and persists the resulting book.
    ///
    /// Passwords are not kept. Once enrolled, only refresh grants are used.
    pub async fn enroll(
        api: Arc<T>,
        store: S,
        logins: impl IntoIterator<Item = (Color, Login)>,
    ) -> Result<Self, SessionError> {
        let mut book = CredentialBook::new();
        for (color, login) in logins {
            let tokens = api
                .authorize(&login.username, &login.password)
                .await
                .map_err(|e| SessionError::AuthFailed {
                    color,
                    reason: e.to_string(),
                })?;
            let id = api.validate(&tokens.access_token).await?.ok_or_else(|| {
                SessionError::AuthFailed {
                    color,
                    reason: "newly issued access token was rejected".into(),
                }
            })?;
            tracing::info!(%color, username = %login.username, %id, "account enrolled");
            book.insert(
                color,
                PlayerCredential {
                    name: login.username,
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token,
                    id,
                },
            );
        }

        if let Some(missing) = Color::ALL.into_iter().find(|c| book.get(*c).is_none()) {
            return Err(SessionError::NotFound(missing));
        }
        store.save(&book).await?;
        Ok(Self::new(api, store, book))
    }

    /// Returns an access token for `color` that the server accepted just now.
    ///
    /// Refreshes (and persists) the token pair if the stored access token
    /// was rejected.
    ///
    /// # Errors
    /// - [`SessionError::AuthFailed`]: the refresh grant failed, or the
    ///   token belongs to a different account than the one stored
    /// - [`SessionError::Transport`]: the token could not be checked
    /// - [`SessionError::NotFound`]: no credential for `color`
    pub async fn ensure_fresh(&self, color: Color) -> Result<String, SessionError> {
        let _gate = self.gates[color.team()].lock().await;
        let current = self.credential(color).await?;

        match self.api.validate(&current.access_token).await? {
            Some(id) if id == current.id => {
                tracing::debug!(%color, "access token still valid");
                return Ok(current.access_token);
            }
            Some(id) => {
                return Err(SessionError::AuthFailed {
                    color,
                    reason: format!("token belongs to {id}, expected {}", current.id),
                });
            }
            None => {}
        }

        tracing::info!(%color, "access token rejected, refreshing");
        let tokens = self
            .api
            .refresh(&current.name, &current.refresh_token)
            .await
            .map_err(|e| {
                tracing::warn!(%color, error = %e, "token refresh failed");
                SessionError::AuthFailed {
                    color,
                    reason: e.to_string(),
                }
            })?;
        let access = tokens.access_token.clone();

        let mut book = self.book.lock().await;
        book.get_mut(color)
            .ok_or(SessionError::NotFound(color))?
            .set_tokens(tokens);
        self.store.save(&book).await?;
        tracing::info!(%color, "tokens refreshed and saved");

        Ok(access)
    }

    /// A snapshot of the stored credential for `color`.
    pub async fn credential(&self, color: Color) -> Result<PlayerCredential, SessionError> {
        self.book
            .lock()
            .await
            .get(color)
            .cloned()
            .ok_or(SessionError::NotFound(color))
    }

    /// The server account id that plays `color`.
    pub async fn player_id(&self, color: Color) -> Result<PlayerId, SessionError> {
        Ok(self.credential(color).await?.id)
    }

    /// A snapshot of the whole book.
    pub async fn book(&self) -> CredentialBook {
        self.book.lock().await.clone()
    }

    pub fn api(&self) -> &Arc<T> {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
