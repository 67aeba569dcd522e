//! Durable storage for the credential book.
//!
//! The book is always written in full. There are no partial or append
//! writes, so whatever is on disk is a complete book from some point in time.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::{CredentialBook, SessionError};

/// Loads and saves the credential book.
///
/// `load` runs once at startup, before any game exists, so it is
/// synchronous. `save` runs inside token refreshes on the async runtime.
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns the stored book, or `None` if nothing has been stored yet.
    fn load(&self) -> Result<Option<CredentialBook>, SessionError>;

    /// Replaces the stored book.
    fn save(
        &self,
        book: &CredentialBook,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// Stores the book as pretty-printed JSON (conventionally `players.json`).
///
/// Saves go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous book intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for JsonFileStore {
    fn load(&self) -> Result<Option<CredentialBook>, SessionError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, book: &CredentialBook) -> Result<(), SessionError> {
        let bytes = serde_json::to_vec_pretty(book)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), "credential book saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Keeps the book in process memory. Nothing survives a restart.
///
/// Counts saves, which makes it handy for checking that every mutation
/// was flushed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    book: Mutex<Option<CredentialBook>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `book`.
    pub fn with_book(book: CredentialBook) -> Self {
        Self {
            book: Mutex::new(Some(book)),
            saves: AtomicUsize::new(0),
        }
    }

    /// How many times [`CredentialStore::save`] has been called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The most recently saved (or initial) book.
    pub fn snapshot(&self) -> Option<CredentialBook> {
        self.book
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<CredentialBook>, SessionError> {
        Ok(self.snapshot())
    }

    async fn save(&self, book: &CredentialBook) -> Result<(), SessionError> {
        *self.book.lock().unwrap_or_else(PoisonError::into_inner) = Some(book.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
