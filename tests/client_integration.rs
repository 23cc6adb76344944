//! End-to-end tests over a real HTTP stack against mock backends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param,
    query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campus_client::{
    ApiClient, ApiError, BridgeConfig, BridgeOutcome, ClientConfig, CredentialStore, FileStore,
    LandingTable, LocationPort, MemoryStore, NoopHooks, Query, Role, Service, Session,
    SessionBridge, SessionHooks, SessionState, UploadFile, UserProfile,
};

fn config_for(server: &MockServer) -> ClientConfig {
    let base = format!("{}/api", server.uri());
    ClientConfig {
        errand_url: base.clone(),
        lostfound_url: base,
        timeout_ms: 5_000,
    }
}

fn client_for(server: &MockServer, store: Arc<dyn CredentialStore>) -> ApiClient {
    ApiClient::new(config_for(server), store, Arc::new(NoopHooks))
}

fn sample_session(token: &str, role: Role) -> Session {
    Session {
        token: token.to_string(),
        user: UserProfile {
            id: 1,
            role,
            username: Some("alice".to_string()),
            extra: Default::default(),
        },
    }
}

struct FlagHooks {
    expired: AtomicBool,
}

impl FlagHooks {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            expired: AtomicBool::new(false),
        })
    }
}

impl SessionHooks for FlagHooks {
    fn auth_expired(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }
}

struct MockLocation {
    url: Mutex<String>,
    redirects: Mutex<Vec<String>>,
}

impl MockLocation {
    fn new(url: &str) -> Arc<Self> {
        Arc::new(Self {
            url: Mutex::new(url.to_string()),
            redirects: Mutex::new(Vec::new()),
        })
    }

    fn visible_url(&self) -> String {
        self.url.lock().unwrap().clone()
    }

    fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl LocationPort for MockLocation {
    fn current_url(&self) -> String {
        self.visible_url()
    }

    fn replace_url(&self, url: &str) {
        *self.url.lock().unwrap() = url.to_string();
    }

    fn redirect(&self, url: &str) {
        self.redirects.lock().unwrap().push(url.to_string());
    }
}

#[tokio::test]
async fn all_envelope_shapes_normalize_to_the_same_payload() {
    let server = MockServer::start().await;
    let payload = json!({"id": 9, "title": "umbrella"});

    Mock::given(method("GET"))
        .and(path("/api/shape/numeric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "data": payload, "msg": "ok"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/shape/flag"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "data": payload, "message": "ok"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/shape/bare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryStore::new()));
    for shape in ["numeric", "flag", "bare"] {
        let result = client
            .get(Service::LostFound, &format!("/shape/{}", shape), Query::new())
            .await
            .unwrap();
        assert_eq!(result, payload, "shape: {}", shape);
    }
}

#[tokio::test]
async fn absent_query_values_are_not_serialized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/task/list"))
        .and(query_param("page", "1"))
        .and(query_param_is_missing("keyword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryStore::new()));
    client
        .errand()
        .tasks(Query::new().set("page", 1).set_opt("keyword", None::<String>))
        .await
        .unwrap();
}

#[tokio::test]
async fn auxiliary_catalog_operations_map_to_their_routes() {
    let server = MockServer::start().await;
    let ok = || ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": null}));

    for (m, p) in [
        ("GET", "/api/home/banners"),
        ("GET", "/api/home/stats"),
        ("GET", "/api/home/recommended-runners"),
        ("GET", "/api/runner/applications/detail/12"),
        ("GET", "/api/api/item/8"),
        ("GET", "/api/admin/users/export"),
    ] {
        Mock::given(method(m))
            .and(path(p))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/api/map/route"))
        .and(body_string_contains("\"start\""))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/items/update-image-association"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/users/batch"))
        .and(body_string_contains("\"action\":\"disable\""))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/users/batch-delete"))
        .and(body_string_contains("\"userIds\":[4,5]"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryStore::new()));
    client.errand().banners().await.unwrap();
    client.errand().home_user_stats().await.unwrap();
    client.errand().recommended_runners().await.unwrap();
    client.errand().runner_application_detail(12).await.unwrap();
    client
        .errand()
        .route_plan(json!({"lat": 1.0, "lng": 2.0}), json!({"lat": 3.0, "lng": 4.0}))
        .await
        .unwrap();
    client.lostfound().item_detail(8).await.unwrap();
    client
        .lostfound()
        .update_image_association(json!({"itemId": 8, "imageIds": [1, 2]}))
        .await
        .unwrap();
    client.admin().batch_operate_users(&[4, 5], "disable").await.unwrap();
    client.admin().batch_delete_users(&[4, 5]).await.unwrap();
    client.admin().export_users(Query::new()).await.unwrap();
}

#[tokio::test]
async fn stored_token_is_sent_as_bearer_credential() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(header("Authorization", "Bearer tok-77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.put(&sample_session("tok-77", Role::User)).unwrap();

    let client = client_for(&server, store);
    client.errand().orders(Query::new()).await.unwrap();
}

#[tokio::test]
async fn login_persists_a_session_that_survives_restart() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path_buf = dir.path().join("session.json");

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {
                "token": "fresh-token",
                "user": {"id": 5, "role": "reviewer", "username": "rev"}
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(FileStore::new(path_buf.clone())));
    let session = client
        .auth(Service::LostFound)
        .login(json!({"username": "rev", "password": "pw"}))
        .await
        .unwrap();
    assert_eq!(session.token, "fresh-token");
    assert_eq!(session.role(), Role::Reviewer);

    // Fresh client over the same file: init restores the same session.
    let restarted = client_for(&server, Arc::new(FileStore::new(path_buf)));
    restarted.init().await.unwrap();
    assert_eq!(restarted.session().session().await.unwrap(), session);
}

#[tokio::test]
async fn server_side_expiry_demotes_the_restored_session() {
    let server = MockServer::start().await;

    // The backend has invalidated the token since it was persisted.
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_string("gateway says no"))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.put(&sample_session("stale-token", Role::User)).unwrap();

    let hooks = FlagHooks::new();
    let client = ApiClient::new(config_for(&server), store.clone(), hooks.clone());
    client.init().await.unwrap();
    assert!(client.session().is_authenticated().await);

    let err = client.errand().orders(Query::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::AuthExpired));

    assert_eq!(client.session().state().await, SessionState::Guest);
    assert!(store.get().unwrap().is_none());
    assert!(hooks.expired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn business_errors_surface_code_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/task/3/accept"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 4002, "msg": "task already taken"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryStore::new()));
    let err = client.errand().accept_task(3).await.unwrap_err();
    match err {
        ApiError::Business { code, message } => {
            assert_eq!(code, 4002);
            assert_eq!(message, "task already taken");
        }
        other => panic!("expected business error, got {:?}", other),
    }
}

#[tokio::test]
async fn slow_responses_classify_as_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "data": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.timeout_ms = 50;
    let client = ApiClient::new(config, Arc::new(MemoryStore::new()), Arc::new(NoopHooks));

    let err = client.errand().orders(Query::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn bridge_establishes_session_scrubs_url_and_redirects_by_role() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "data": {"id": 1, "role": "admin"}
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = client_for(&server, store.clone());
    let location = MockLocation::new("http://localhost:5174/?token=abc123");

    let bridge = SessionBridge::new(
        BridgeConfig::new(Service::LostFound, LandingTable::lostfound()).redirect_delay_ms(0),
        location.clone(),
    );
    let outcome = bridge.run(&client).await;

    assert_eq!(outcome, BridgeOutcome::Established(Role::Admin));
    assert!(!location.visible_url().contains("token="));
    assert_eq!(
        location.redirects(),
        vec!["http://localhost:5174/#/pages/admin/dashboard".to_string()]
    );

    let session = client.session().session().await.unwrap();
    assert_eq!(session.token, "abc123");
    assert_eq!(session.role(), Role::Admin);
    // Persisted as if a normal login occurred.
    assert_eq!(store.get().unwrap().unwrap().token, "abc123");
}

#[tokio::test]
async fn bridge_handles_hash_embedded_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .and(header("Authorization", "Bearer hash-tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "data": {"id": 2, "role": "user"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryStore::new()));
    let location = MockLocation::new("http://localhost:5174/#/pages/login/login?token=hash-tok");

    let bridge = SessionBridge::new(
        BridgeConfig::new(Service::LostFound, LandingTable::lostfound()).redirect_delay_ms(0),
        location.clone(),
    );
    let outcome = bridge.run(&client).await;

    assert_eq!(outcome, BridgeOutcome::Established(Role::User));
    assert!(!location.visible_url().contains("token="));
    assert!(location.visible_url().contains("/pages/login/login"));
}

#[tokio::test]
async fn rejected_bridge_token_leaves_a_guest_and_still_scrubs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_string(""))
        .mount(&server)
        .await;

    let hooks = FlagHooks::new();
    let client = ApiClient::new(config_for(&server), Arc::new(MemoryStore::new()), hooks.clone());
    let location = MockLocation::new("http://localhost:5174/?token=bogus");

    let bridge = SessionBridge::new(
        BridgeConfig::new(Service::LostFound, LandingTable::lostfound()).redirect_delay_ms(0),
        location.clone(),
    );
    let outcome = bridge.run(&client).await;

    assert_eq!(outcome, BridgeOutcome::Rejected);
    assert!(!location.visible_url().contains("token="));
    assert!(location.redirects().is_empty());
    assert_eq!(client.session().state().await, SessionState::Guest);
    // A user who was never signed in must not see the signed-out notice.
    assert!(!hooks.expired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn bridge_without_token_is_a_no_op() {
    let server = MockServer::start().await;
    let client = client_for(&server, Arc::new(MemoryStore::new()));
    let location = MockLocation::new("http://localhost:5174/#/pages/home");

    let bridge = SessionBridge::new(
        BridgeConfig::new(Service::LostFound, LandingTable::lostfound()).redirect_delay_ms(0),
        location.clone(),
    );

    assert_eq!(bridge.run(&client).await, BridgeOutcome::NoToken);
    assert_eq!(client.session().state().await, SessionState::Guest);
}

#[tokio::test]
async fn batch_upload_reports_partial_failure_explicitly() {
    let server = MockServer::start().await;

    // One file in the batch stalls past the deadline; the others succeed.
    Mock::given(method("POST"))
        .and(path("/api/upload/item-images"))
        .and(body_string_contains("broken.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "data": [{"url": "/files/late.png"}]}))
                .set_delay(Duration::from_secs(2)),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/upload/item-images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "data": [{"url": "/files/stored.png"}]
        })))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.timeout_ms = 300;
    let client = ApiClient::new(config, Arc::new(MemoryStore::new()), Arc::new(NoopHooks));
    let files = vec![
        UploadFile::new("a.png", b"image-a".to_vec()),
        UploadFile::new("broken.png", b"image-b".to_vec()),
        UploadFile::new("c.png", b"image-c".to_vec()),
    ];

    let report = client
        .uploads()
        .upload_item_images(files, "lost", Some(42))
        .await;

    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.failed[0].file_name, "broken.png");
    assert!(matches!(report.failed[0].error, ApiError::Transport(_)));
    assert!(!report.all_succeeded());
    // Relative URLs come back absolutized against the service base.
    assert!(report.uploaded[0].url.starts_with("http"));
}

#[tokio::test]
async fn batch_upload_against_unreachable_backend_reports_every_failure() {
    let config = ClientConfig {
        errand_url: "http://127.0.0.1:1/api".to_string(),
        lostfound_url: "http://127.0.0.1:1/api".to_string(),
        timeout_ms: 1_000,
    };
    let client = ApiClient::new(config, Arc::new(MemoryStore::new()), Arc::new(NoopHooks));

    let files = vec![
        UploadFile::new("a.png", b"image-a".to_vec()),
        UploadFile::new("b.png", b"image-b".to_vec()),
    ];
    let report = client.uploads().upload_item_images(files, "found", None).await;

    assert!(report.uploaded.is_empty());
    assert_eq!(report.failed.len(), 2);
    assert!(report
        .failed
        .iter()
        .all(|f| matches!(f.error, ApiError::Transport(_))));
}

#[tokio::test]
async fn single_upload_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload/image"))
        .and(body_string_contains("folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "data": {"url": "/files/photo.png", "uploadId": 7}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryStore::new()));
    let descriptor = client
        .uploads()
        .upload_image(UploadFile::new("photo.png", b"image-bytes".to_vec()), "general")
        .await
        .unwrap();

    assert!(descriptor.url.ends_with("/files/photo.png"));
    assert!(descriptor.url.starts_with("http"));
    assert_eq!(descriptor.extra["uploadId"], 7);
}
