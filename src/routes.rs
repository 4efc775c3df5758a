//! Route classification for the appointment platform.
//!
//! The route table is configuration, not runtime input, but its evaluation
//! order is part of the contract: every path belongs to exactly one class,
//! and `public` always wins when a path matches multiple patterns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of roles a session can carry.
///
/// Unknown role strings are rejected at the parse boundary; callers treat a
/// session with an unparseable role as unauthenticated rather than
/// propagating the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A patient booking and managing appointments
    Patient,
    /// A doctor managing their schedule and patients
    Doctor,
    /// A platform administrator
    Admin,
}

impl Role {
    /// The dashboard a freshly authenticated session of this role lands on.
    #[must_use]
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::Patient => "/patient/dashboard",
            Self::Doctor => "/doctor/dashboard",
            Self::Admin => "/admin/dashboard",
        }
    }

    /// String form as stored in the role claim.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role claim carried a string outside the closed set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown role claim")]
pub struct UnknownRole;

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Self::Patient),
            "doctor" => Ok(Self::Doctor),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole),
        }
    }
}

/// The class a path falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Unconditionally reachable, authenticated or not
    Public,
    /// Reachable only while unauthenticated (login, register)
    AuthOnly,
    /// Reachable only by sessions holding the given role
    Protected(Role),
}

/// Static partition of the platform's paths.
#[derive(Debug, Clone)]
pub struct RouteTable {
    /// Exact public paths
    pub public_paths: Vec<String>,
    /// Public subtree roots, matched on path-segment boundaries
    pub public_prefixes: Vec<String>,
    /// Paths reserved for unauthenticated flows
    pub auth_only: Vec<String>,
    /// Protected subtree roots and the role each requires
    pub protected: Vec<(String, Role)>,
    /// Where unauthenticated requests for protected paths are sent
    pub login_path: String,
    /// Where cross-role access attempts are sent
    pub landing_path: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public_paths: vec!["/".to_string(), "/about".to_string(), "/contact".to_string()],
            public_prefixes: vec![
                "/blogs".to_string(),
                "/doctors".to_string(),
                "/services".to_string(),
            ],
            auth_only: vec!["/login".to_string(), "/register".to_string()],
            protected: vec![
                ("/patient".to_string(), Role::Patient),
                ("/doctor".to_string(), Role::Doctor),
                ("/admin".to_string(), Role::Admin),
            ],
            login_path: "/login".to_string(),
            landing_path: "/".to_string(),
        }
    }
}

/// True when `path` equals `prefix` or sits inside its subtree.
///
/// The boundary check keeps `/doctors` (public listing) from matching the
/// `/doctor` protected subtree.
fn prefix_matches(prefix: &str, path: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

impl RouteTable {
    /// Whether the path belongs to the public set.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
            || self.public_prefixes.iter().any(|p| prefix_matches(p, path))
    }

    /// Whether the path belongs to the auth-only set.
    #[must_use]
    pub fn is_auth_only(&self, path: &str) -> bool {
        self.auth_only.iter().any(|p| prefix_matches(p, path))
    }

    /// The role a protected path requires, if any.
    #[must_use]
    pub fn protected_role(&self, path: &str) -> Option<Role> {
        self.protected
            .iter()
            .find(|(prefix, _)| prefix_matches(prefix, path))
            .map(|(_, role)| *role)
    }

    /// Classify a path, honoring the public-wins precedence.
    ///
    /// Returns `None` for unclassified paths; the edge gate allows those.
    #[must_use]
    pub fn classify(&self, path: &str) -> Option<RouteClass> {
        if self.is_public(path) {
            return Some(RouteClass::Public);
        }
        if self.is_auth_only(path) {
            return Some(RouteClass::AuthOnly);
        }
        self.protected_role(path).map(RouteClass::Protected)
    }
}
