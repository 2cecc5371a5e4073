//! Authentication, identity and rate limiting through the full router.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use memories_server::AppState;
use memories_server::api::error::ErrorBody;
use memories_server::config::{AppConfig, PersistenceProvider};
use memories_server::domain::memory::Memory;
use memories_server::persistence::providers::memory::InMemoryProvider;
use memories_server::security::claims::UserClaims;
use memories_server::security::identity::ClaimsIdentity;
use memories_server::server::build_app;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const SECRET: &str = "integration-test-secret";

fn config(jwt_required: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.persistence.provider = PersistenceProvider::Memory;
    config.security.jwt_required = jwt_required;
    config.security.jwt_secret = SECRET.to_string();
    config
}

fn server(config: AppConfig, fallback: Option<Uuid>) -> TestServer {
    let state = AppState::new(
        Arc::new(InMemoryProvider::new()),
        Arc::new(ClaimsIdentity::new(fallback)),
        Arc::new(config),
    );
    TestServer::new(build_app(state)).unwrap()
}

fn token(sub: &str, secret: &str) -> String {
    let exp = (Utc::now() + Duration::hours(1)).timestamp() as usize;
    let claims = UserClaims {
        sub: sub.to_string(),
        name: Some("Tester".to_string()),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn required_jwt_rejects_missing_token() {
    let server = server(config(true), None);

    let response = server.get("/memories").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<ErrorBody>().kind, "unauthorized");

    server
        .post("/memories")
        .json(&json!({"content": "x", "coverURL": "y"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public_even_when_jwt_required() {
    server(config(true), None)
        .get("/health")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn token_subject_owns_created_memory() {
    let server = server(config(true), Some(Uuid::new_v4()));
    let subject = Uuid::new_v4();

    let response = server
        .post("/memories")
        .authorization_bearer(token(&subject.to_string(), SECRET))
        .json(&json!({"content": "mine", "coverURL": "c"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Memory>().user_id, subject);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let server = server(config(false), Some(Uuid::new_v4()));

    let response = server
        .get("/memories")
        .authorization_bearer(token(&Uuid::new_v4().to_string(), "someone-else"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/memories")
        .authorization_bearer("not.a.jwt")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_uuid_subject_cannot_write() {
    let server = server(config(true), Some(Uuid::new_v4()));

    let response = server
        .post("/memories")
        .authorization_bearer(token("github|42", SECRET))
        .json(&json!({"content": "x", "coverURL": "y"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn optional_jwt_falls_back_to_default_user() {
    let fallback = Uuid::new_v4();
    let server = server(config(false), Some(fallback));

    let response = server
        .post("/memories")
        .json(&json!({"content": "anon", "coverURL": "c"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Memory>().user_id, fallback);
}

#[tokio::test]
async fn anonymous_reads_allowed_but_writes_need_an_owner() {
    let server = server(config(false), None);

    server.get("/memories").await.assert_status_ok();

    let response = server
        .post("/memories")
        .json(&json!({"content": "x", "coverURL": "y"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rate_limiter_rejects_once_burst_is_spent() {
    let mut config = config(false);
    config.resilience.rate_limit_enabled = true;
    config.resilience.requests_per_second = 1;
    config.resilience.burst_size = 2;
    let server = server(config, None);

    server.get("/health").await.assert_status_ok();
    server.get("/health").await.assert_status_ok();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json::<ErrorBody>().kind, "rate_limited");
}
