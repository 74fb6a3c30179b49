use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use comuhub_auth::infra::supabase::SupabaseClient;
use comuhub_auth::router::build_router;
use comuhub_auth::state::AppState;

fn test_app(supabase: &MockServer) -> TestServer {
    let timeout = Duration::from_secs(5);
    let state = AppState {
        admin: SupabaseClient::new(&supabase.uri(), "service-role-key", timeout).unwrap(),
        public: SupabaseClient::new(&supabase.uri(), "anon-key", timeout).unwrap(),
    };
    TestServer::new(build_router(state)).unwrap()
}

async fn mount_empty_user_list(supabase: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
        .mount(supabase)
        .await;
}

async fn mount_created_user(supabase: &MockServer, id: &str, email: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "email": email,
            "email_confirmed_at": "2026-10-19T12:00:00Z",
        })))
        .expect(1)
        .mount(supabase)
        .await;
}

fn register_body() -> Value {
    json!({
        "email": "ana@example.com",
        "password": "secret-123",
        "name": "Ana",
        "role": "cliente",
        "phone": "+57 300 000 0000",
    })
}

#[tokio::test]
async fn register_returns_session_and_role() {
    let supabase = MockServer::start().await;
    mount_empty_user_list(&supabase).await;
    mount_created_user(&supabase, "u-1", "ana@example.com").await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": "u-1" }])))
        .expect(1)
        .mount(&supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-access",
            "refresh_token": "jwt-refresh",
            "user": { "id": "u-1", "email": "ana@example.com" },
        })))
        .expect(1)
        .mount(&supabase)
        .await;

    let server = test_app(&supabase);
    let response = server.post("/auth/register").json(&register_body()).await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "access_token": "jwt-access",
            "refresh_token": "jwt-refresh",
            "user": { "id": "u-1", "email": "ana@example.com", "role": "cliente" },
        })
    );
}

#[tokio::test]
async fn register_rolls_back_identity_and_returns_400_when_profile_insert_fails() {
    let supabase = MockServer::start().await;
    mount_empty_user_list(&supabase).await;
    mount_created_user(&supabase, "u-1", "ana@example.com").await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"profiles_pkey\"",
        })))
        .mount(&supabase)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/auth/v1/admin/users/u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&supabase)
        .await;

    let server = test_app(&supabase);
    let response = server
        .post("/auth/register")
        .json(&register_body())
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let detail = response.json::<Value>()["detail"]
        .as_str()
        .unwrap_or_default()
        .to_owned();
    assert!(
        detail.starts_with("could not save records: profiles"),
        "unexpected detail: {detail}"
    );
}

#[tokio::test]
async fn register_rejects_unknown_role_with_400() {
    let supabase = MockServer::start().await;
    let server = test_app(&supabase);

    let mut body = register_body();
    body["role"] = json!("admin");
    let response = server
        .post("/auth/register")
        .json(&body)
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(supabase.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn register_rejects_malformed_body_with_400() {
    let supabase = MockServer::start().await;
    let server = test_app(&supabase);

    let response = server
        .post("/auth/register")
        .json(&json!({ "email": "ana@example.com" }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["detail"].is_string());
}

#[tokio::test]
async fn login_returns_tokens_and_user() {
    let supabase = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-access",
            "refresh_token": "jwt-refresh",
            "user": { "id": "u-1", "email": "ana@example.com" },
        })))
        .mount(&supabase)
        .await;

    let server = test_app(&supabase);
    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "ana@example.com", "password": "secret-123" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "access_token": "jwt-access",
            "refresh_token": "jwt-refresh",
            "user": { "id": "u-1", "email": "ana@example.com" },
        })
    );
}

#[tokio::test]
async fn login_returns_401_with_flat_detail() {
    let supabase = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials",
        })))
        .mount(&supabase)
        .await;

    let server = test_app(&supabase);
    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "ana@example.com", "password": "wrong" }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "invalid credentials" })
    );
}

#[tokio::test]
async fn login_rejects_non_json_body_with_400() {
    let supabase = MockServer::start().await;
    let server = test_app(&supabase);

    let response = server
        .post("/auth/login")
        .text("email=ana@example.com")
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoints_and_request_id() {
    let supabase = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&supabase)
        .await;

    let server = test_app(&supabase);

    let live = server.get("/healthz").await;
    live.assert_status_ok();
    assert!(live.headers().get("x-request-id").is_some());

    let ready = server.get("/readyz").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<Value>()["status"], "ready");
}
