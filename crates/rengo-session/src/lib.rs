//! Account credentials for Rengo.
//!
//! Every team plays through one server account (black or white). This crate
//! keeps those accounts usable:
//!
//! 1. **Enrollment**: trading a username/password for a token pair once
//!    ([`SessionBroker::enroll`])
//! 2. **Freshness**: making sure the access token still works before every
//!    action, refreshing it when it doesn't ([`SessionBroker::ensure_fresh`])
//! 3. **Persistence**: writing the whole credential book after every change
//!    so a restart doesn't need passwords again ([`CredentialStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! rengo (above)          ← asks for a fresh token before every action
//!     ↕
//! Session (this crate)   ← owns the credential book
//!     ↕
//! Transport (below)      ← TokenApi: authorize / refresh / validate
//! ```

mod broker;
mod credential;
mod error;
mod store;

pub use broker::{Login, SessionBroker};
pub use credential::{CredentialBook, PlayerCredential};
pub use error::SessionError;
pub use store::{CredentialStore, JsonFileStore, MemoryStore};
