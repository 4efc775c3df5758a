//! The richer, client-cached view of who is logged in.

use crate::identity::backend::ProfilePayload;
use crate::routes::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The closed identity shape held by a browsing context.
///
/// Reactive state, never persisted: it is reconstructible from the stored
/// session token at any time, so losing it on reload is safe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySnapshot {
    /// Stable account identifier
    pub id: Uuid,
    /// Login email
    pub email: String,
    /// Name shown in the header and on dashboards
    pub display_name: String,
    /// Role as stated by the signed role claim
    pub role: Role,
    /// References to richer profile resources (photo, specialty, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl IdentitySnapshot {
    /// Assemble a snapshot from a profile body and the role claim.
    ///
    /// The role always comes from the claim; any role-like field in the
    /// profile body stays inert inside `extra`. This is what keeps
    /// `resolve()` from ever upgrading privilege beyond the claim.
    #[must_use]
    pub fn from_parts(role: Role, profile: ProfilePayload) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            display_name: profile.display_name,
            role,
            extra: profile.extra,
        }
    }
}
