//! Durable credential storage.
//!
//! A dumb durable cell holding the current session. No validation happens
//! here; writes are whole-session replacements with last-writer-wins
//! semantics. Storage failures surface as [`ApiError::Storage`] instead of
//! being swallowed, so callers can tell a missing session from a broken
//! disk.

use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::session::{Session, UserProfile};

/// Process-wide durable key/value capability for the session.
pub trait CredentialStore: Send + Sync {
    /// Read the persisted session, if any.
    fn get(&self) -> Result<Option<Session>>;
    /// Replace the persisted session.
    fn put(&self, session: &Session) -> Result<()>;
    /// Remove the persisted session.
    fn clear(&self) -> Result<()>;
}

/// On-disk persisted form: the `token` and `user` keys the apps have
/// always written.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: UserProfile,
}

/// File-backed store persisting the session as a single JSON document.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn storage_err(e: impl std::fmt::Display) -> ApiError {
    ApiError::Storage(e.to_string())
}

impl CredentialStore for FileStore {
    fn get(&self) -> Result<Option<Session>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_err(e)),
        };
        let stored: StoredSession = serde_json::from_str(&raw).map_err(storage_err)?;
        Ok(Some(Session {
            token: stored.token,
            user: stored.user,
        }))
    }

    fn put(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let stored = StoredSession {
            token: session.token.clone(),
            user: session.user.clone(),
        };
        let raw = serde_json::to_string_pretty(&stored).map_err(storage_err)?;
        std::fs::write(&self.path, raw).map_err(storage_err)?;
        debug!(path = %self.path.display(), "Persisted session");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err(e)),
        }
    }
}

/// In-memory store for tests and hosts that manage persistence themselves.
pub struct MemoryStore {
    cell: RwLock<Option<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            cell: RwLock::new(None),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<Session>> {
        Ok(self
            .cell
            .read()
            .map_err(|_| ApiError::Storage("session cell poisoned".to_string()))?
            .clone())
    }

    fn put(&self, session: &Session) -> Result<()> {
        *self
            .cell
            .write()
            .map_err(|_| ApiError::Storage("session cell poisoned".to_string()))? =
            Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .cell
            .write()
            .map_err(|_| ApiError::Storage("session cell poisoned".to_string()))? = None;
        Ok(())
    }
}
