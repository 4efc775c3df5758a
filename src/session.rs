//! Durable session state: the token/role pair.
//!
//! The token and the role claim are only meaningful together, so the store
//! API never exposes a partial write: the whole record is replaced in a
//! single observable step, and split states are unrepresentable.

use crate::error::GateError;
use crate::routes::Role;
use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opaque credential issued by the identity backend on login.
///
/// The gate never inspects its structure beyond presence. `Debug` redacts
/// the value so it cannot leak through logs.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token as issued by the backend.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Access the raw value, e.g. for a bearer header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// The atomically written token/role pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    /// Opaque session credential
    pub token: SessionToken,
    /// Role claim issued alongside the token
    pub role: Role,
}

/// Durable storage shared across contexts of the same profile.
///
/// Reads are synchronous (the edge gate and cold-start hydration must not
/// block on network), and the only write is a whole-record replace.
pub trait SessionStore: Send + Sync {
    /// Synchronous read of the current record.
    fn load(&self) -> Result<Option<SessionRecord>, GateError>;

    /// Atomically replace the whole record; `None` clears it.
    fn replace(&self, record: Option<SessionRecord>) -> Result<(), GateError>;
}

/// In-memory store backed by a lock-free atomic pointer swap.
///
/// Clones share the same storage, modeling multiple browsing contexts of
/// one profile.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    inner: Arc<ArcSwapOption<SessionRecord>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, GateError> {
        Ok(self.inner.load_full().map(|record| (*record).clone()))
    }

    fn replace(&self, record: Option<SessionRecord>) -> Result<(), GateError> {
        self.inner.store(record.map(Arc::new));
        Ok(())
    }
}

/// File-backed store persisted per profile.
///
/// Writes go to a sibling temp file first and land via rename, so a reader
/// never observes a torn record.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store persisting to the given path. The file is created on
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, GateError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let record = serde_json::from_slice(&bytes)?;
        Ok(Some(record))
    }

    fn replace(&self, record: Option<SessionRecord>) -> Result<(), GateError> {
        match record {
            Some(record) => {
                let bytes = serde_json::to_vec(&record)?;
                let tmp = self.temp_path();
                fs::write(&tmp, bytes)?;
                fs::rename(&tmp, &self.path)?;
            }
            None => match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            },
        }
        Ok(())
    }
}

impl fmt::Debug for FileSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSessionStore")
            .field("path", &self.path)
            .finish()
    }
}

/// Convenience constructor used by config wiring.
pub fn store_at(path: Option<&Path>) -> Arc<dyn SessionStore> {
    match path {
        Some(path) => Arc::new(FileSessionStore::new(path)),
        None => Arc::new(InMemorySessionStore::new()),
    }
}
