//! Credential types: what we know about each server account.

use std::collections::BTreeMap;

use rengo_protocol::{Color, PlayerId};
use rengo_transport::TokenPair;
use serde::{Deserialize, Serialize};

/// One server account and its current token pair.
///
/// Field names match the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCredential {
    /// Account username on the game server.
    pub name: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Server-assigned account id.
    pub id: PlayerId,
}

impl PlayerCredential {
    /// Replaces both tokens. They are only ever stored as a pair.
    pub fn set_tokens(&mut self, tokens: TokenPair) {
        self.access_token = tokens.access_token;
        self.refresh_token = tokens.refresh_token;
    }
}

/// All account credentials, keyed by the color the account plays.
///
/// Serializes as `{"black": {...}, "white": {...}}`. A `BTreeMap` keeps the
/// key order stable so rewriting an unchanged book produces identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialBook(BTreeMap<Color, PlayerCredential>);

impl CredentialBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, color: Color) -> Option<&PlayerCredential> {
        self.0.get(&color)
    }

    pub fn get_mut(&mut self, color: Color) -> Option<&mut PlayerCredential> {
        self.0.get_mut(&color)
    }

    /// Adds or replaces the credential for `color`.
    pub fn insert(&mut self, color: Color, credential: PlayerCredential) {
        self.0.insert(color, credential);
    }

    /// Returns `true` if both colors have a credential.
    pub fn is_complete(&self) -> bool {
        Color::ALL.iter().all(|c| self.0.contains_key(c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
