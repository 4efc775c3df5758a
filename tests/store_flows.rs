//! Identity store flows against a mocked identity backend.

use serde_json::json;
use session_gate::identity::HttpIdentityBackend;
use session_gate::session::{InMemorySessionStore, SessionStore};
use session_gate::{
    ChangeBus, Credentials, GateError, IdentityStore, Role, SessionRecord, SessionToken,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT_ID: &str = "5f6b0a4e-8f13-4d2a-9a60-1f1f3f2b7c11";

/// One browser profile: contexts built from it share storage and the bus.
struct Profile {
    sessions: InMemorySessionStore,
    bus: ChangeBus,
    backend_url: Url,
}

impl Profile {
    fn new(server: &MockServer) -> Self {
        Self {
            sessions: InMemorySessionStore::new(),
            bus: ChangeBus::default(),
            backend_url: Url::parse(&server.uri()).unwrap(),
        }
    }

    /// A fresh browsing context of this profile.
    fn context(&self) -> IdentityStore {
        let backend = HttpIdentityBackend::new(&self.backend_url, Duration::from_secs(2))
            .expect("backend construction");
        IdentityStore::new(
            Arc::new(backend),
            Arc::new(self.sessions.clone()),
            self.bus.clone(),
        )
    }

    fn seed_session(&self, token: &str, role: Role) {
        self.sessions
            .replace(Some(SessionRecord {
                token: SessionToken::new(token),
                role,
            }))
            .unwrap();
    }
}

fn credentials() -> Credentials {
    Credentials {
        email: "pat@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

async fn mock_login(server: &MockServer, status: u16, role: &str) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-abc",
            "role": role,
            "profile": {
                "id": ACCOUNT_ID,
                "email": "pat@example.com",
                "displayName": "Pat Doe"
            }
        }))
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mock_profile(server: &MockServer, status: u16, body: serde_json::Value) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(body)
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(template)
        .mount(server)
        .await;
}

fn profile_body() -> serde_json::Value {
    json!({
        "id": ACCOUNT_ID,
        "email": "pat@example.com",
        "displayName": "Pat Doe"
    })
}

#[tokio::test]
async fn test_login_caches_identity_and_notifies() {
    let server = MockServer::start().await;
    mock_login(&server, 200, "patient").await;

    let profile = Profile::new(&server);
    let store = profile.context();
    let mut listener = store.subscribe();

    let snapshot = store.login(&credentials()).await.unwrap();
    assert_eq!(snapshot.role, Role::Patient);
    assert_eq!(snapshot.email, "pat@example.com");

    let cached = store.current_identity().expect("snapshot cached after login");
    assert_eq!(cached.role, Role::Patient);

    // The logging-in context observes its own notification.
    let seen = tokio::time::timeout(Duration::from_secs(1), listener.changed())
        .await
        .unwrap();
    assert!(seen);
}

#[tokio::test]
async fn test_login_invalid_credentials_writes_nothing() {
    let server = MockServer::start().await;
    mock_login(&server, 401, "").await;

    let profile = Profile::new(&server);
    let store = profile.context();
    let mut listener = store.subscribe();

    let err = store.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, GateError::InvalidCredentials));

    assert!(store.current_identity().is_none());
    assert_eq!(profile.sessions.load().unwrap(), None);
    assert!(!listener.try_changed());
}

#[tokio::test]
async fn test_login_backend_down_is_retryable() {
    let server = MockServer::start().await;
    mock_login(&server, 503, "").await;

    let profile = Profile::new(&server);
    let store = profile.context();

    let err = store.login(&credentials()).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(store.current_identity().is_none());
    assert_eq!(profile.sessions.load().unwrap(), None);
}

#[tokio::test]
async fn test_logout_is_idempotent_and_notifies_once() {
    let server = MockServer::start().await;
    mock_login(&server, 200, "doctor").await;

    let profile = Profile::new(&server);
    let store = profile.context();
    store.login(&credentials()).await.unwrap();

    let mut listener = store.subscribe();

    store.logout().unwrap();
    assert!(store.current_identity().is_none());
    assert_eq!(profile.sessions.load().unwrap(), None);
    assert!(listener.try_changed());

    // Second logout: same end state, no error, no further notification.
    store.logout().unwrap();
    assert!(store.current_identity().is_none());
    assert!(!listener.try_changed());
}

#[tokio::test]
async fn test_resolve_hydrates_second_context() {
    let server = MockServer::start().await;
    mock_login(&server, 200, "doctor").await;
    mock_profile(&server, 200, profile_body()).await;

    let profile = Profile::new(&server);
    let first = profile.context();
    first.login(&credentials()).await.unwrap();

    // A context opened later holds no snapshot until it resolves.
    let second = profile.context();
    assert!(second.current_identity().is_none());

    let resolved = second.resolve().await.unwrap().expect("token resolves");
    assert_eq!(resolved.role, Role::Doctor);
    assert_eq!(second.current_identity().unwrap().role, Role::Doctor);
}

#[tokio::test]
async fn test_resolve_without_token_is_none() {
    let server = MockServer::start().await;
    let profile = Profile::new(&server);
    let store = profile.context();

    assert!(store.resolve().await.unwrap().is_none());
    assert!(store.current_identity().is_none());
}

#[tokio::test]
async fn test_resolve_revoked_token_clears_session_and_notifies() {
    let server = MockServer::start().await;
    mock_profile(&server, 401, json!({})).await;

    let profile = Profile::new(&server);
    profile.seed_session("tok-stale", Role::Patient);

    let store = profile.context();
    let mut listener = store.subscribe();

    assert!(store.resolve().await.unwrap().is_none());
    assert_eq!(profile.sessions.load().unwrap(), None);
    assert!(listener.try_changed());
}

#[tokio::test]
async fn test_resolve_transient_failure_preserves_state() {
    let server = MockServer::start().await;
    mock_profile(&server, 500, json!({})).await;

    let profile = Profile::new(&server);
    profile.seed_session("tok-abc", Role::Patient);

    let store = profile.context();
    let mut listener = store.subscribe();

    let err = store.resolve().await.unwrap_err();
    assert!(err.is_retryable());

    // The pair survives a transient outage; only a definitive rejection
    // counts as revocation.
    assert!(profile.sessions.load().unwrap().is_some());
    assert!(!listener.try_changed());
}

#[tokio::test]
async fn test_resolve_takes_role_from_claim_not_profile() {
    let server = MockServer::start().await;
    let mut body = profile_body();
    body["role"] = json!("admin");
    mock_profile(&server, 200, body).await;

    let profile = Profile::new(&server);
    profile.seed_session("tok-abc", Role::Patient);

    let store = profile.context();
    let resolved = store.resolve().await.unwrap().unwrap();
    assert_eq!(resolved.role, Role::Patient);
}

#[tokio::test]
async fn test_resolve_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(bearer_token("tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let profile = Profile::new(&server);
    profile.seed_session("tok-abc", Role::Patient);

    let store = profile.context();
    assert!(store.resolve().await.unwrap().is_some());
}
