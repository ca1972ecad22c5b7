//! Client-side session behavior against a mocked HTTP server.
//!
//! These tests pin down the interceptor contract: bearer attachment, error
//! normalization, and the auto-logout that a 401/403 on an authenticated
//! call must trigger exactly once.

use keyplan::client::{
    ApiClient, FileStorage, MemoryStorage, Navigator, Session, SessionStorage,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Navigator that counts redirects instead of performing them.
#[derive(Default)]
struct CountingNavigator(AtomicUsize);

impl Navigator for CountingNavigator {
    fn to_login(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn login_body(id: i64, email: &str, role: &str, token: &str) -> serde_json::Value {
    serde_json::json!({
        "message": "Login successful!",
        "user": {
            "id": id,
            "email": email,
            "role": role,
            "isActive": true,
            "firstName": "Test",
            "lastName": "User"
        },
        "token": token
    })
}

struct Harness {
    mock: MockServer,
    client: ApiClient,
    navigator: Arc<CountingNavigator>,
    storage: Arc<dyn SessionStorage>,
}

async fn harness_with_storage(storage: Arc<dyn SessionStorage>) -> Harness {
    let mock = MockServer::start().await;
    let navigator = Arc::new(CountingNavigator::default());
    let session = Arc::new(Session::restore(storage.clone(), navigator.clone()));
    let client = ApiClient::new(format!("{}/api", mock.uri()), session);

    Harness {
        mock,
        client,
        navigator,
        storage,
    }
}

async fn harness() -> Harness {
    harness_with_storage(Arc::new(MemoryStorage::new())).await
}

impl Harness {
    async fn mock_login_success(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_body(
                1,
                "test@example.com",
                "client",
                token,
            )))
            .up_to_n_times(1)
            .mount(&self.mock)
            .await;
    }
}

#[tokio::test]
async fn login_establishes_session_and_publishes_identity() {
    let h = harness().await;
    h.mock_login_success("tok-abc").await;

    let receiver = h.client.session().subscribe();
    assert!(receiver.borrow().is_none());

    let user = h
        .client
        .login("test@example.com", "password123")
        .await
        .expect("login succeeds");

    assert_eq!(user.id, 1);
    assert_eq!(h.client.session().token(), Some("tok-abc".to_string()));
    assert_eq!(h.client.session().current().map(|u| u.id), Some(1));
    assert_eq!(receiver.borrow().as_ref().map(|u| u.id), Some(1));
    assert_eq!(h.navigator.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_login_surfaces_server_message_without_touching_session() {
    let h = harness().await;

    // An earlier login leaves the session authenticated.
    h.mock_login_success("tok-old").await;
    h.client
        .login("test@example.com", "password123")
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "message": "Invalid credentials." })),
        )
        .mount(&h.mock)
        .await;

    let err = h
        .client
        .login("test@example.com", "wrong")
        .await
        .expect_err("login must fail");

    assert_eq!(err.message, "Invalid credentials.");
    // The existing session survives a failed re-login.
    assert_eq!(h.client.session().token(), Some("tok-old".to_string()));
    assert_eq!(h.client.session().current().map(|u| u.id), Some(1));
    assert_eq!(h.navigator.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn forbidden_api_call_logs_out_exactly_once() {
    let h = harness().await;
    h.mock_login_success("tok-abc").await;
    h.client
        .login("test@example.com", "password123")
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({ "message": "Access denied." })),
        )
        .mount(&h.mock)
        .await;

    let err = h.client.get_users().await.expect_err("call must fail");

    assert_eq!(err.message, "Session expired or invalid. Please log in again.");
    assert_eq!(h.client.session().token(), None);
    assert_eq!(h.client.session().current(), None);
    assert!(!h.client.session().is_logged_in());
    assert_eq!(
        h.navigator.0.load(Ordering::SeqCst),
        1,
        "one failing call triggers one redirect"
    );
}

#[tokio::test]
async fn unauthorized_api_call_also_logs_out() {
    let h = harness().await;
    h.mock_login_success("tok-abc").await;
    h.client
        .login("test@example.com", "password123")
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.mock)
        .await;

    h.client.list_projects().await.expect_err("call must fail");

    assert_eq!(h.client.session().token(), None);
    assert_eq!(h.navigator.0.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn auto_logout_clears_persisted_file_state() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    let h = harness_with_storage(Arc::new(FileStorage::open(&file))).await;

    h.mock_login_success("tok-abc").await;
    h.client
        .login("test@example.com", "password123")
        .await
        .unwrap();
    assert!(h.storage.get("authToken").is_some());

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&h.mock)
        .await;
    h.client.get_users().await.expect_err("call must fail");

    assert_eq!(h.storage.get("authToken"), None);
    assert_eq!(h.storage.get("currentUser"), None);

    // A fresh process reading the same file starts unauthenticated.
    let reopened = Session::restore(
        Arc::new(FileStorage::open(&file)),
        Arc::new(CountingNavigator::default()),
    );
    assert!(!reopened.is_logged_in());
}

#[tokio::test]
async fn bearer_token_is_attached_to_api_calls() {
    let h = harness().await;
    h.mock_login_success("tok-bearer").await;
    h.client
        .login("test@example.com", "password123")
        .await
        .unwrap();

    // The mock only matches when the exact bearer header is present.
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("authorization", "Bearer tok-bearer"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "users": [] })),
        )
        .mount(&h.mock)
        .await;

    let users = h.client.get_users().await.expect("header was attached");
    assert!(users.is_empty());
}

#[tokio::test]
async fn other_server_errors_are_normalized_without_logout() {
    let h = harness().await;
    h.mock_login_success("tok-abc").await;
    h.client
        .login("test@example.com", "password123")
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(serde_json::json!({ "message": "This email is already in use." })),
        )
        .up_to_n_times(1)
        .mount(&h.mock)
        .await;

    let err = h
        .client
        .create_user(&keyplan::types::CreateUserRequest {
            email: "dup@example.com".to_string(),
            password: "password123".to_string(),
            first_name: "Dup".to_string(),
            last_name: "Licate".to_string(),
            role: None,
        })
        .await
        .expect_err("conflict must fail");

    assert_eq!(err.message, "This email is already in use.");
    // A 409 is not an auth failure; the session stays.
    assert!(h.client.session().is_logged_in());
    assert_eq!(h.navigator.0.load(Ordering::SeqCst), 0);

    // A body without a message falls back to a generic error.
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.mock)
        .await;

    let err = h.client.list_projects().await.expect_err("500 must fail");
    assert_eq!(err.message, "Server error (500)");
    assert!(h.client.session().is_logged_in());
}
