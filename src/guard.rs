//! Reactive guard: the post-mount, identity-aware access check.
//!
//! The edge gate's decision can be stale by the time a view renders (a
//! token revoked between requests) and it cannot see richer identity
//! fields, so every protected view runs this second check. The guard is a
//! small state machine: `Initializing` blocks protected content while the
//! identity resolves, then settles into `Authorized` or `Unauthorized`.
//! Unlike the edge gate, the guard fails closed: it protects content it has
//! already been asked to render, so any resolution failure redirects.

use crate::events::ChangeListener;
use crate::identity::{IdentitySnapshot, IdentityStore};
use crate::routes::{Role, RouteTable};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lifecycle states of a mounted protected view.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardState {
    /// Identity resolution pending; protected content stays hidden
    Initializing,
    /// Identity matches the view's required role
    Authorized(IdentitySnapshot),
    /// No matching identity; the caller must navigate to `redirect`
    Unauthorized {
        /// Target mirroring the edge gate's rules: login with return
        /// target when unauthenticated, the landing page on role mismatch
        redirect: String,
    },
}

impl GuardState {
    /// Whether protected content may be shown.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }

    /// The redirect the caller must perform, when unauthorized.
    #[must_use]
    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { redirect } => Some(redirect),
            _ => None,
        }
    }
}

/// Guard instance for one mounted protected view.
pub struct RouteGuard {
    store: Arc<IdentityStore>,
    required_role: Role,
    view_path: String,
    login_path: String,
    landing_path: String,
    state: GuardState,
}

impl RouteGuard {
    /// Create a guard for a view requiring `required_role`, mounted at
    /// `view_path`. Redirect targets come from the route table so guard
    /// and gate stay consistent.
    pub fn new(
        store: Arc<IdentityStore>,
        required_role: Role,
        view_path: impl Into<String>,
        table: &RouteTable,
    ) -> Self {
        Self {
            store,
            required_role,
            view_path: view_path.into(),
            login_path: table.login_path.clone(),
            landing_path: table.landing_path.clone(),
            state: GuardState::Initializing,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Run the mount check: enter `Initializing`, resolve the identity,
    /// and settle. Dropping the guard mid-resolve simply abandons it; no
    /// cleanup depends on completion.
    pub async fn mount(&mut self) -> &GuardState {
        self.state = GuardState::Initializing;
        self.state = self.check().await;
        debug!(
            path = %self.view_path,
            authorized = self.state.is_authorized(),
            "guard settled"
        );
        &self.state
    }

    /// Wait for the next identity-change notification, then re-run the
    /// mount check from scratch.
    ///
    /// A notification is the programmatic equivalent of a fresh
    /// navigation: a logout elsewhere demotes an `Authorized` view, and a
    /// login elsewhere recovers a previously `Unauthorized` one. Returns
    /// `false` once the bus is gone.
    pub async fn on_change(&mut self, listener: &mut ChangeListener) -> bool {
        if !listener.changed().await {
            return false;
        }
        self.mount().await;
        true
    }

    async fn check(&self) -> GuardState {
        match self.store.resolve().await {
            Ok(Some(identity)) if identity.role == self.required_role => {
                GuardState::Authorized(identity)
            }
            Ok(Some(identity)) => {
                // Mirrors edge gate rule 4: degrade to the landing page.
                warn!(
                    path = %self.view_path,
                    held = %identity.role,
                    required = %self.required_role,
                    "role mismatch on mounted view"
                );
                GuardState::Unauthorized {
                    redirect: self.landing_path.clone(),
                }
            }
            Ok(None) => GuardState::Unauthorized {
                redirect: self.login_redirect(),
            },
            Err(err) => {
                // Fail closed: an unresolved identity never renders
                // protected content and never surfaces an error screen.
                warn!(path = %self.view_path, error = %err, "identity resolution failed");
                GuardState::Unauthorized {
                    redirect: self.login_redirect(),
                }
            }
        }
    }

    // Mirrors edge gate rule 2.
    fn login_redirect(&self) -> String {
        format!("{}?callbackUrl={}", self.login_path, self.view_path)
    }
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("required_role", &self.required_role)
            .field("view_path", &self.view_path)
            .field("state", &self.state)
            .finish()
    }
}

/// Convenience check for views that only need the decision, not a
/// long-lived guard. Failures settle into `Unauthorized` like every other
/// outcome.
pub async fn check_once(
    store: &Arc<IdentityStore>,
    required_role: Role,
    view_path: &str,
    table: &RouteTable,
) -> GuardState {
    let mut guard = RouteGuard::new(Arc::clone(store), required_role, view_path, table);
    guard.mount().await;
    guard.state
}
