#![allow(clippy::unwrap_used)]
// Integration tests for `Gateway` using wiremock.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parkly_api::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use parkly_api::{
    ApiRequest, AuthExpiryInterceptor, Credentials, Error, Gateway, GeocodingClient, Identity,
    MemoryTokenStorage, Navigator, Role, Route, SessionStore, TokenStorage, Tokens,
    TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    server: MockServer,
    gateway: Gateway,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    storage: Arc<MemoryTokenStorage>,
}

async fn setup() -> Harness {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryTokenStorage::new());
    let session = Arc::new(SessionStore::load(storage.clone()).unwrap());
    let navigator = Arc::new(Navigator::default());
    let gateway = Gateway::new(&server.uri(), &TransportConfig::default(), session.clone())
        .unwrap()
        .with_interceptor(Arc::new(AuthExpiryInterceptor::new(
            session.clone(),
            navigator.clone(),
        )));

    Harness {
        server,
        gateway,
        session,
        navigator,
        storage,
    }
}

fn log_in(session: &SessionStore) {
    session
        .login(
            Identity {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                role: Role::Admin,
            },
            Tokens {
                access: "access-abc".into(),
                refresh: Some("refresh-xyz".into()),
            },
        )
        .unwrap();
}

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: u64,
}

// ── Header policy ───────────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_attached_when_logged_in() {
    let h = setup().await;
    log_in(&h.session);

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("authorization", "Bearer access-abc"))
        .and(header("accept-language", "uz"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let rows: Vec<Row> = h.gateway.list("/users").await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_no_authorization_header_when_anonymous() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;

    let _: Vec<Row> = h.gateway.list("users").await.unwrap();

    let received = h.server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}

// ── Envelope normalization ──────────────────────────────────────────

#[tokio::test]
async fn test_list_unwraps_data_envelope() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 1}]})))
        .mount(&h.server)
        .await;

    let rows: Vec<Row> = h.gateway.list("payments").await.unwrap();
    assert_eq!(rows, vec![Row { id: 1 }]);
}

#[tokio::test]
async fn test_list_accepts_bare_array() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}, {"id": 4}])))
        .mount(&h.server)
        .await;

    let rows: Vec<Row> = h.gateway.list("reservations").await.unwrap();
    assert_eq!(rows, vec![Row { id: 3 }, Row { id: 4 }]);
}

#[tokio::test]
async fn test_list_object_without_data_is_empty() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0})))
        .mount(&h.server)
        .await;

    let rows: Vec<Row> = h.gateway.list("users").await.unwrap();
    assert!(rows.is_empty());
}

// ── Error taxonomy ──────────────────────────────────────────────────

#[tokio::test]
async fn test_401_clears_session_and_redirects_to_login() {
    let h = setup().await;
    log_in(&h.session);

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let mut route_rx = h.navigator.subscribe();
    let result: Result<Vec<Row>, Error> = h.gateway.list("users").await;

    assert!(matches!(result, Err(Error::AuthExpired)));
    assert!(!h.session.is_authenticated());
    assert!(h.session.identity().is_none());
    assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
    assert_eq!(h.storage.get(REFRESH_TOKEN_KEY).unwrap(), None);
    assert_eq!(h.navigator.current(), Route::Login);
    assert!(route_rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_server_error_keeps_session() {
    let h = setup().await;
    log_in(&h.session);

    Mock::given(method("DELETE"))
        .and(path("/users/9"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "database unavailable"})),
        )
        .mount(&h.server)
        .await;

    let result = h.gateway.request(ApiRequest::delete("users/9")).await;

    match result {
        Err(Error::Http {
            status, message, ..
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
    assert!(h.session.is_authenticated());
    assert_eq!(h.navigator.current(), Route::Dashboard);
}

#[tokio::test]
async fn test_not_found_is_classified() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/payments/abc"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.server)
        .await;

    let err = h
        .gateway
        .request(ApiRequest::get("payments/abc"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let session = Arc::new(SessionStore::ephemeral());
    // Port 9 (discard) is closed on test hosts.
    let gateway = Gateway::new(
        "http://127.0.0.1:9",
        &TransportConfig::default(),
        session,
    )
    .unwrap();

    let err = gateway.request(ApiRequest::get("users")).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)), "got: {err:?}");
}

#[tokio::test]
async fn test_malformed_list_is_deserialization_error() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "not-a-number"}])))
        .mount(&h.server)
        .await;

    let result: Result<Vec<Row>, Error> = h.gateway.list("users").await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

// ── Request shaping ─────────────────────────────────────────────────

#[tokio::test]
async fn test_patch_sends_query_parameters() {
    let h = setup().await;
    log_in(&h.session);

    Mock::given(method("PATCH"))
        .and(path("/parking-spots/4"))
        .and(query_param("bSpots", "3"))
        .and(query_param("cSpots", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
        .expect(1)
        .mount(&h.server)
        .await;

    let req = ApiRequest::patch("parking-spots/4")
        .query("bSpots", 3)
        .query("cSpots", 1);
    let row: Row = h.gateway.send(req).await.unwrap();
    assert_eq!(row, Row { id: 4 });
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let h = setup().await;
    log_in(&h.session);

    let body = json!({"full_name": "Bob", "contact": "+998901234567", "password": "pw", "role": "USER"});
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 12})))
        .expect(1)
        .mount(&h.server)
        .await;

    let row: Row = h
        .gateway
        .send(ApiRequest::post("users", &body).unwrap())
        .await
        .unwrap();
    assert_eq!(row.id, 12);
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let h = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/reservations/2"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&h.server)
        .await;

    let value = h
        .gateway
        .request(ApiRequest::delete("reservations/2"))
        .await
        .unwrap();
    assert!(value.is_null());
}

#[tokio::test]
async fn test_upload_is_multipart_with_bearer() {
    let h = setup().await;
    log_in(&h.session);

    Mock::given(method("POST"))
        .and(path("/parking-spots/upload/7"))
        .and(header("authorization", "Bearer access-abc"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&h.server)
        .await;

    h.gateway
        .upload("parking-spots/upload/7", "file", "front.jpg", b"jpeg".to_vec())
        .await
        .unwrap();

    let received = h.server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"front.jpg\""));
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_records_session() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"username": "ada", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "token": "fresh-token",
            "refreshToken": "fresh-refresh"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let identity = h
        .gateway
        .login(&Credentials {
            username: "ada".into(),
            password: "secret".to_string().into(),
        })
        .await
        .unwrap();

    assert_eq!(identity.name, "Ada Lovelace");
    assert_eq!(identity.email, "ada@example.com");
    assert_eq!(identity.role, Role::Admin);
    assert!(h.session.is_authenticated());
    assert_eq!(
        h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(),
        Some("fresh-token")
    );
    assert_eq!(
        h.storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(),
        Some("fresh-refresh")
    );
}

#[tokio::test]
async fn test_login_rejected_is_authentication_error() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let result = h
        .gateway
        .login(&Credentials {
            username: "ada".into(),
            password: "wrong".to_string().into(),
        })
        .await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!h.session.is_authenticated());
}

#[tokio::test]
async fn test_login_without_token_is_rejected() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "x@y.z"})))
        .mount(&h.server)
        .await;

    let result = h
        .gateway
        .login(&Credentials {
            username: "ada".into(),
            password: "pw".to_string().into(),
        })
        .await;

    assert!(matches!(result, Err(Error::Authentication { .. })));
    assert!(!h.session.is_authenticated());
}

// ── Geocoding ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_geocode_returns_best_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Amir Temur 1, Tashkent"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "41.3111", "lon": "69.2797", "display_name": "Amir Temur"}
        ])))
        .mount(&server)
        .await;

    let client = GeocodingClient::new(&server.uri(), &TransportConfig::default()).unwrap();
    let coords = client.lookup("Amir Temur 1, Tashkent").await.unwrap();

    assert!((coords.latitude - 41.3111).abs() < 1e-9);
    assert!((coords.longitude - 69.2797).abs() < 1e-9);
}

#[tokio::test]
async fn test_geocode_failure_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = GeocodingClient::new(&server.uri(), &TransportConfig::default()).unwrap();
    assert!(client.lookup("nowhere").await.is_none());
    assert!(client.lookup("   ").await.is_none());
}

#[tokio::test]
async fn test_geocode_empty_result_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = GeocodingClient::new(&server.uri(), &TransportConfig::default()).unwrap();
    assert!(client.lookup("Atlantis").await.is_none());
}
