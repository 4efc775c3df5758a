//! Edge gate: the pre-render access decision.
//!
//! A synchronous, pure function invoked once per navigation before any
//! content is produced. It inspects only the target path, the presence of a
//! session token, and the role claim, and returns a decision the caller
//! executes. It performs no I/O, never suspends, and never errors: every
//! input maps to a decision, with unclassified paths falling through to
//! `Allow` so unlisted public assets keep working.

use crate::routes::{Role, RouteTable};

/// Outcome of an edge gate evaluation. The caller performs the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the navigation proceed
    Allow,
    /// Send the requester to the given target instead
    RedirectTo(String),
}

/// Evaluate a navigation against the route table.
///
/// Rules are applied in strict order, first match wins:
///
/// 1. Public paths are allowed unconditionally.
/// 2. Protected paths with no token redirect to login, carrying the
///    requested path as the return target.
/// 3. Auth-only paths with an authenticated session redirect to the role's
///    home dashboard.
/// 4. Protected paths whose required role differs from the held role
///    redirect to the landing page, never an error page.
/// 5. Everything else is allowed.
#[must_use]
pub fn evaluate(table: &RouteTable, path: &str, token_present: bool, role: Option<Role>) -> Decision {
    // Rule 1: public access is unconditional and must not be short-circuited
    // by auth state.
    if table.is_public(path) {
        return Decision::Allow;
    }

    let required = table.protected_role(path);

    // Rule 2: unauthenticated access to a protected subtree resumes at the
    // requested path after login.
    if required.is_some() && !token_present {
        return Decision::RedirectTo(login_redirect(table, path));
    }

    // Rule 3: authenticated sessions never see login/register screens. A
    // role claim without a token is meaningless, so both must be present.
    if table.is_auth_only(path) && token_present {
        if let Some(role) = role {
            return Decision::RedirectTo(role.home_path().to_string());
        }
    }

    // Rule 4: cross-role access degrades to the landing page. A patient
    // probing /admin/* learns nothing beyond "not allowed here".
    if let Some(required) = required {
        if role != Some(required) {
            return Decision::RedirectTo(table.landing_path.clone());
        }
    }

    // Rule 5: fail open for unclassified paths.
    Decision::Allow
}

/// Evaluate from raw request-time claims.
///
/// Applies the pair invariant before the rule table: a missing token, a
/// missing role, or a role outside the closed set makes the whole pair
/// unauthenticated. Tampered role claims therefore land on the login
/// redirect for protected paths rather than being propagated.
#[must_use]
pub fn evaluate_request(
    table: &RouteTable,
    path: &str,
    token: Option<&str>,
    role: Option<&str>,
) -> Decision {
    let role = match (token, role) {
        (Some(_), Some(raw)) => raw.parse::<Role>().ok(),
        _ => None,
    };
    evaluate(table, path, role.is_some(), role)
}

/// The login target with the originally requested path as return target.
fn login_redirect(table: &RouteTable, path: &str) -> String {
    format!("{}?callbackUrl={}", table.login_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::default()
    }

    #[test]
    fn test_public_allowed_without_token() {
        assert_eq!(evaluate(&table(), "/", false, None), Decision::Allow);
        assert_eq!(evaluate(&table(), "/blogs/flu-season", false, None), Decision::Allow);
    }

    #[test]
    fn test_public_allowed_with_any_session() {
        for role in [Role::Patient, Role::Doctor, Role::Admin] {
            assert_eq!(evaluate(&table(), "/about", true, Some(role)), Decision::Allow);
        }
    }

    #[test]
    fn test_protected_without_token_redirects_to_login_with_return_target() {
        assert_eq!(
            evaluate(&table(), "/patient/dashboard", false, None),
            Decision::RedirectTo("/login?callbackUrl=/patient/dashboard".to_string())
        );
    }

    #[test]
    fn test_auth_only_with_session_redirects_to_role_home() {
        assert_eq!(
            evaluate(&table(), "/login", true, Some(Role::Admin)),
            Decision::RedirectTo("/admin/dashboard".to_string())
        );
        assert_eq!(
            evaluate(&table(), "/register", true, Some(Role::Patient)),
            Decision::RedirectTo("/patient/dashboard".to_string())
        );
    }

    #[test]
    fn test_auth_only_without_session_allowed() {
        assert_eq!(evaluate(&table(), "/login", false, None), Decision::Allow);
    }

    #[test]
    fn test_cross_role_access_degrades_to_landing_page() {
        assert_eq!(
            evaluate(&table(), "/admin/dashboard", true, Some(Role::Doctor)),
            Decision::RedirectTo("/".to_string())
        );
    }

    #[test]
    fn test_matching_role_allowed() {
        assert_eq!(
            evaluate(&table(), "/doctor/schedule", true, Some(Role::Doctor)),
            Decision::Allow
        );
    }

    #[test]
    fn test_unclassified_path_fails_open() {
        assert_eq!(evaluate(&table(), "/favicon.ico", false, None), Decision::Allow);
        assert_eq!(evaluate(&table(), "", true, Some(Role::Admin)), Decision::Allow);
    }

    #[test]
    fn test_tampered_role_treated_as_unauthenticated() {
        assert_eq!(
            evaluate_request(&table(), "/admin/users", Some("tok-1"), Some("superuser")),
            Decision::RedirectTo("/login?callbackUrl=/admin/users".to_string())
        );
    }

    #[test]
    fn test_role_without_token_is_meaningless() {
        assert_eq!(
            evaluate_request(&table(), "/patient/appointments", None, Some("patient")),
            Decision::RedirectTo("/login?callbackUrl=/patient/appointments".to_string())
        );
    }

    #[test]
    fn test_malformed_role_on_public_path_still_allowed() {
        assert_eq!(
            evaluate_request(&table(), "/doctors", Some("tok-1"), Some("not-a-role")),
            Decision::Allow
        );
    }
}
