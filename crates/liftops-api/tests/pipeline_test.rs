#![allow(clippy::unwrap_used)]
// Integration tests for the authenticated request pipeline using wiremock.
//
// Covers the contract the rest of the client leans on: fail-fast when
// signed out, bearer attachment, bare auth endpoints, single-flight
// refresh, retry-once, terminal refresh failure, and the error taxonomy.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use liftops_api::{ApiClient, Error, ErrorKind, SessionState, TokenPair, TokenStore};

// ── Helpers ─────────────────────────────────────────────────────────

/// Matches requests that carry no Authorization header at all --
/// the contract for `auth/login` and `auth/refresh`.
struct NoAuthHeader;

impl Match for NoAuthHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "success": true, "message": null, "data": data, "errors": [] })
}

fn plan_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "elevatorId": 10,
        "templateId": 3,
        "plannedDate": "2024-06-01",
        "status": "PLANNED",
        "note": null,
        "completedDate": null,
        "minPhotos": 4
    })
}

fn client_signed_in(server: &MockServer, access: &str, refresh: &str) -> ApiClient {
    let store = Arc::new(TokenStore::in_memory());
    store.replace(TokenPair::new(access, refresh));
    client_with_store(server, store)
}

fn client_with_store(server: &MockServer, store: Arc<TokenStore>) -> ApiClient {
    let base_url = Url::parse(&server.uri()).unwrap();
    ApiClient::with_client(reqwest::Client::new(), base_url, store)
}

// ── Fail-fast ───────────────────────────────────────────────────────

#[tokio::test]
async fn signed_out_request_fails_without_touching_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_with_store(&server, Arc::new(TokenStore::in_memory()));
    let result = client.list_plans().await;

    match result {
        Err(e) => assert_eq!(e.kind(), ErrorKind::Authentication),
        Ok(_) => panic!("expected Authentication error"),
    }
}

// ── Bearer attachment ───────────────────────────────────────────────

#[tokio::test]
async fn attaches_bearer_to_resource_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maintenance-plans"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([plan_json(1)]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "tok-1", "r-1");
    let plans = client.list_plans().await.unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].id, 1);
}

#[tokio::test]
async fn login_goes_out_bare_and_installs_tokens() {
    let server = MockServer::start().await;

    // Pre-seed a stale pair to prove login never forwards it.
    let store = Arc::new(TokenStore::in_memory());
    store.replace(TokenPair::new("stale", "stale-r"));

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(NoAuthHeader)
        .and(body_partial_json(json!({ "username": "ops.demir" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "accessToken": "fresh",
            "refreshToken": "fresh-r",
            "user": { "id": 7, "username": "ops.demir", "role": "PERSONEL" }
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_store(&server, Arc::clone(&store));
    let secret: secrecy::SecretString = "hunter2".to_string().into();
    let login = client.login("ops.demir", &secret).await.unwrap();

    assert_eq!(login.user.id, 7);
    assert_eq!(store.access_token().as_deref(), Some("fresh"));
    assert_eq!(*client.session_states().borrow(), SessionState::Active);
}

// ── Single-flight refresh ───────────────────────────────────────────

#[tokio::test]
async fn concurrent_auth_failures_trigger_exactly_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maintenance-plans"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(NoAuthHeader)
        .and(body_partial_json(json!({ "refreshToken": "r-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "accessToken": "fresh",
            "refreshToken": "r-2"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/maintenance-plans"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([plan_json(1)]))))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "stale", "r-1");

    let (a, b) = tokio::join!(client.list_plans(), client.list_plans());
    assert_eq!(a.unwrap().len(), 1);
    assert_eq!(b.unwrap().len(), 1);

    // New pair installed for subsequent calls.
    assert_eq!(client.token_store().access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn retried_request_is_never_replayed_twice() {
    let server = MockServer::start().await;

    // Every resource call is rejected, refreshed token or not.
    Mock::given(method("GET"))
        .and(path("/maintenance-plans"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "accessToken": "fresh",
            "refreshToken": "r-2"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "stale", "r-1");
    let result = client.list_plans().await;

    match result {
        Err(e) => assert_eq!(e.kind(), ErrorKind::Authentication),
        Ok(_) => panic!("expected the second auth failure to surface"),
    }
}

#[tokio::test]
async fn rejected_refresh_terminates_the_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maintenance-plans"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "stale", "r-1");
    let mut session = client.session_states();

    let result = client.list_plans().await;

    assert!(matches!(result, Err(Error::SessionExpired)));
    assert!(!client.token_store().is_authenticated());
    assert_eq!(*session.borrow_and_update(), SessionState::Expired);
}

#[tokio::test]
async fn rejected_refresh_removes_persisted_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maintenance-plans"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("tokens.json");
    let store = Arc::new(TokenStore::with_file(token_file.clone()));
    store.replace(TokenPair::new("stale", "r-1"));
    assert!(token_file.exists());

    let client = client_with_store(&server, store);
    let result = client.list_plans().await;

    // The session is over on disk too: a restart stays signed out.
    assert!(matches!(result, Err(Error::SessionExpired)));
    assert!(!token_file.exists());
}

#[tokio::test]
async fn failure_storm_fails_together_after_one_refresh_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maintenance-plans"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "stale", "r-1");

    let (a, b) = tokio::join!(client.list_plans(), client.list_plans());
    assert!(matches!(a, Err(Error::SessionExpired)));
    assert!(matches!(b, Err(Error::SessionExpired)));
}

// ── Error taxonomy ──────────────────────────────────────────────────

#[tokio::test]
async fn not_found_maps_to_not_found_kind() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "plan not found",
            "data": null,
            "errors": []
        })))
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "tok", "r");
    let err = client.list_plans().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("plan not found"));
}

#[tokio::test]
async fn validation_failure_carries_field_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "message": "plannedDate is invalid",
            "data": null,
            "errors": ["plannedDate must not be in the past"]
        })))
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "tok", "r");
    match client.list_plans().await {
        Err(Error::Validation { message, errors }) => {
            assert_eq!(message, "plannedDate is invalid");
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_map_to_server_kind() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "tok", "r");
    let err = client.list_plans().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerError);
}

#[tokio::test]
async fn success_false_envelope_raises_with_its_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "slot already claimed",
            "data": null,
            "errors": []
        })))
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "tok", "r");
    let err = client.list_plans().await.unwrap_err();
    assert!(err.to_string().contains("slot already claimed"));
}

// ── Endpoint surfaces ───────────────────────────────────────────────

#[tokio::test]
async fn validate_qr_returns_bound_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/qr-sessions/validate"))
        .and(body_partial_json(json!({ "qrCode": "QR-5", "elevatorId": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "qrSessionToken": "qs-abc",
            "elevatorId": 5
        }))))
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "tok", "r");
    let grant = client.validate_qr("QR-5", 5).await.unwrap();
    assert_eq!(grant.qr_session_token, "qs-abc");
    assert_eq!(grant.elevator_id, Some(5));
}

#[tokio::test]
async fn cancel_plan_patches_status_cancelled() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/maintenance-plans/9"))
        .and(body_partial_json(json!({ "status": "CANCELLED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "cancelled",
            "data": null,
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_signed_in(&server, "tok", "r");
    client.cancel_plan(9).await.unwrap();
}
