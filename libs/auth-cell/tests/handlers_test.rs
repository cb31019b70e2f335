use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use auth_cell::router::auth_routes;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

#[tokio::test]
async fn validate_accepts_a_good_token() {
    let config = TestConfig::default().to_app_config();
    let user = TestUser::patient("asha@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, None);
    let app = auth_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/validate")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["valid"], true);
    assert_eq!(json["user_id"], user.id);
}

#[tokio::test]
async fn validate_rejects_an_expired_token() {
    let config = TestConfig::default().to_app_config();
    let user = TestUser::patient("asha@example.com");
    let token = JwtTestUtils::create_expired_token(&user, &config.supabase_jwt_secret);
    let app = auth_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/validate")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_reports_invalid_without_erroring() {
    let config = TestConfig::default().to_app_config();
    let app = auth_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/verify")
                .header(
                    "Authorization",
                    format!("Bearer {}", JwtTestUtils::create_malformed_token()),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["valid"], false);
}

#[tokio::test]
async fn register_rejects_bad_email() {
    let config = TestConfig::default().to_app_config();
    let app = auth_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "email": "not-an-email",
                        "password": "long-enough-password",
                        "first_name": "Asha",
                        "last_name": "Nair"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let config = TestConfig::default().to_app_config();
    let app = auth_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "email": "asha@example.com",
                        "password": "short",
                        "first_name": "Asha",
                        "last_name": "Nair"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_creates_account_and_patient_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-session-token",
            "user": { "id": "7d4a1b2c-3e5f-4a6b-8c9d-0e1f2a3b4c5d" }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": "7d4a1b2c-3e5f-4a6b-8c9d-0e1f2a3b4c5d" }
        ])))
        .mount(&mock_server)
        .await;

    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = mock_server.uri();
    let app = auth_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "email": "asha@example.com",
                        "password": "long-enough-password",
                        "first_name": "Asha",
                        "last_name": "Nair"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["user_id"], "7d4a1b2c-3e5f-4a6b-8c9d-0e1f2a3b4c5d");
    assert_eq!(json["access_token"], "new-session-token");
}

#[tokio::test]
async fn login_maps_provider_rejection_to_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&mock_server)
        .await;

    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = mock_server.uri();
    let app = auth_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "email": "asha@example.com",
                        "password": "wrong-password"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
