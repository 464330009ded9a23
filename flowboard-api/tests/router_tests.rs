//! Router and authentication-layer tests
//!
//! These run without a database: the pool is constructed lazily and the
//! requests below are all rejected by the auth layer (or answered by the
//! health handler's degraded path) before any query is attempted.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{access_token_for, json_request, offline_app, response_json};
use tower::Service as _;
use uuid::Uuid;

#[tokio::test]
async fn protected_routes_require_a_token() {
    let mut app = offline_app();

    for uri in [
        "/api/boards",
        "/api/tasks/assigned-to-me",
        "/api/tasks/reviewing",
        "/api/auth/email-check?email=a@example.com",
    ] {
        let response = app
            .call(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "expected 401 for {}",
            uri
        );
    }
}

#[tokio::test]
async fn non_bearer_credentials_are_a_bad_request() {
    let mut app = offline_app();

    let response = app
        .call(
            Request::builder()
                .uri("/api/boards")
                .header("authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let mut app = offline_app();

    let response = app
        .call(
            Request::builder()
                .uri("/api/boards")
                .header("authorization", "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn health_answers_without_database() {
    let mut app = offline_app();

    let response = app
        .call(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The lazy pool cannot reach a server, so the endpoint reports a
    // degraded service rather than failing.
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn security_headers_are_present_on_responses() {
    let mut app = offline_app();

    let response = app
        .call(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
}

#[tokio::test]
async fn malformed_register_payload_is_rejected_before_the_database() {
    let mut app = offline_app();

    // Invalid email and mismatched passwords fail validation; no query runs.
    let response = app
        .call(json_request(
            "POST",
            "/api/auth/register",
            None,
            r#"{
                "email": "not-an-email",
                "password": "Passw0rdA",
                "repeated_password": "Passw0rdA",
                "fullname": "Ada Lovelace"
            }"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn register_requires_first_and_last_name() {
    let mut app = offline_app();

    let response = app
        .call(json_request(
            "POST",
            "/api/auth/register",
            None,
            r#"{
                "email": "ada@example.com",
                "password": "Passw0rdA",
                "repeated_password": "Passw0rdA",
                "fullname": "Ada"
            }"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["details"][0]["field"], "fullname");
}

#[tokio::test]
async fn refresh_rejects_access_tokens() {
    let mut app = offline_app();

    // A valid *access* token is not accepted by the refresh endpoint.
    let token = access_token_for(Uuid::new_v4());
    let response = app
        .call(json_request(
            "POST",
            "/api/auth/refresh",
            None,
            &format!(r#"{{"refresh_token": "{}"}}"#, token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
