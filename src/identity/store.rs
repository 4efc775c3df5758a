//! Per-context source of truth for "who is logged in now".
//!
//! The store owns the cached snapshot, delegates verification to the
//! identity backend, performs the atomic token/role pair writes, and
//! publishes a change notification after every write it reports. The cache
//! exists for rendering only; the edge gate reads the signed claims
//! directly and never consults it.

use crate::error::GateError;
use crate::events::{ChangeBus, ChangeListener};
use crate::identity::backend::IdentityBackend;
use crate::identity::snapshot::IdentitySnapshot;
use crate::session::{SessionRecord, SessionStore};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Login form input. `Debug` never prints the password.
#[derive(Clone)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Plaintext password, forwarded to the backend once and never stored
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One browsing context's identity state.
///
/// Contexts of the same profile share the [`SessionStore`] and the
/// [`ChangeBus`]; each holds its own cached snapshot.
pub struct IdentityStore {
    backend: Arc<dyn IdentityBackend>,
    sessions: Arc<dyn SessionStore>,
    bus: ChangeBus,
    cached: RwLock<Option<IdentitySnapshot>>,
}

impl IdentityStore {
    /// Wire a context to its backend, shared storage, and change bus.
    pub fn new(
        backend: Arc<dyn IdentityBackend>,
        sessions: Arc<dyn SessionStore>,
        bus: ChangeBus,
    ) -> Self {
        Self {
            backend,
            sessions,
            bus,
            cached: RwLock::new(None),
        }
    }

    /// Listener for identity-change notifications on this profile.
    #[must_use]
    pub fn subscribe(&self) -> ChangeListener {
        self.bus.subscribe()
    }

    /// Verify credentials and establish the session.
    ///
    /// On success the token/role pair is written as one record, the
    /// snapshot is cached, and every live context is notified. On failure
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` or `ServiceUnavailable` from the backend,
    /// `Storage` when the pair cannot be persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<IdentitySnapshot, GateError> {
        let outcome = self
            .backend
            .login(&credentials.email, &credentials.password)
            .await?;

        let snapshot = IdentitySnapshot::from_parts(outcome.role, outcome.profile);
        self.sessions.replace(Some(SessionRecord {
            token: outcome.token,
            role: outcome.role,
        }))?;
        *self.cached.write() = Some(snapshot.clone());
        self.bus.publish();

        info!(role = %outcome.role, "login established session");
        Ok(snapshot)
    }

    /// Clear the session and notify all contexts.
    ///
    /// Idempotent: with no active session this is a no-op, not an error,
    /// and publishes nothing (there is no write to report).
    ///
    /// # Errors
    ///
    /// `Storage` when the durable pair cannot be cleared.
    pub fn logout(&self) -> Result<(), GateError> {
        let had_session = self.sessions.load()?.is_some();
        let had_snapshot = self.cached.read().is_some();
        if !had_session && !had_snapshot {
            debug!("logout with no active session, nothing to do");
            return Ok(());
        }

        self.sessions.replace(None)?;
        *self.cached.write() = None;
        self.bus.publish();

        info!("session cleared");
        Ok(())
    }

    /// Synchronous read of the cached snapshot. Never touches the network.
    #[must_use]
    pub fn current_identity(&self) -> Option<IdentitySnapshot> {
        self.cached.read().clone()
    }

    /// Re-derive the snapshot from the stored token.
    ///
    /// Used on mount to hydrate after a reload where only the token
    /// persisted. A token the backend no longer recognizes is treated as a
    /// logout: the pair and the cache are cleared and a change notification
    /// goes out. The snapshot's role always comes from the stored claim,
    /// never from the profile body.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` on transient backend failure; local state is
    /// left untouched so a later attempt can still succeed.
    pub async fn resolve(&self) -> Result<Option<IdentitySnapshot>, GateError> {
        let Some(record) = self.sessions.load()? else {
            *self.cached.write() = None;
            return Ok(None);
        };

        match self.backend.fetch_profile(&record.token).await? {
            Some(profile) => {
                let snapshot = IdentitySnapshot::from_parts(record.role, profile);
                *self.cached.write() = Some(snapshot.clone());
                debug!(role = %record.role, "identity resolved from stored token");
                Ok(Some(snapshot))
            }
            None => {
                warn!("stored token no longer recognized, clearing session");
                self.sessions.replace(None)?;
                *self.cached.write() = None;
                self.bus.publish();
                Ok(None)
            }
        }
    }
}

impl fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityStore")
            .field("cached", &self.cached.read().is_some())
            .finish()
    }
}
