use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};
use chrono::Utc;
use regex::Regex;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;
use shared_utils::jwt;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn validate_email(email: &str) -> Result<(), AppError> {
    // Shape check only; the auth provider performs the real verification.
    let pattern = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if pattern.is_match(email) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!("Invalid email address: {}", email)))
    }
}

/// Register a patient account: sign up with the auth provider, then create
/// the patient profile row keyed by the new user id.
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    validate_email(&request.email)?;

    if request.password.len() < 8 {
        return Err(AppError::ValidationError(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let client = SupabaseClient::new(&config);

    let signup: Value = client
        .request(
            Method::POST,
            "/auth/v1/signup",
            None,
            Some(json!({
                "email": request.email,
                "password": request.password,
                "data": {
                    "first_name": request.first_name,
                    "last_name": request.last_name,
                    "role": "patient"
                }
            })),
        )
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    let user_id = signup
        .get("user")
        .and_then(|u| u.get("id"))
        .or_else(|| signup.get("id"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::ExternalService("Signup response missing user id".to_string()))?
        .to_string();

    let access_token = signup
        .get("access_token")
        .and_then(|v| v.as_str())
        .map(String::from);

    // Create the patient profile; registration still succeeds if the row
    // already exists from a previous partial signup.
    if let Some(ref token) = access_token {
        let patient_row = json!({
            "id": user_id,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "email": request.email,
            "created_at": Utc::now(),
            "updated_at": Utc::now()
        });

        if let Err(e) = client.insert_row("patients", patient_row, token).await {
            debug!("Patient row creation failed for {}: {}", user_id, e);
        }
    }

    info!("Registered patient account {}", user_id);

    Ok(Json(json!({
        "user_id": user_id,
        "access_token": access_token,
        "message": "Registration successful"
    })))
}

/// Password-grant login proxy.
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    validate_email(&request.email)?;

    let client = SupabaseClient::new(&config);

    let session: Value = client
        .request(
            Method::POST,
            "/auth/v1/token?grant_type=password",
            None,
            Some(json!({
                "email": request.email,
                "password": request.password
            })),
        )
        .await
        .map_err(|_| AppError::Auth("Invalid email or password".to_string()))?;

    debug!("Login succeeded for {}", request.email);

    Ok(Json(json!({
        "access_token": session.get("access_token"),
        "refresh_token": session.get("refresh_token"),
        "expires_in": session.get("expires_in"),
        "user": session.get("user")
    })))
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;

    match jwt::validate_token(&token, &config.supabase_jwt_secret) {
        Ok(user) => Ok(Json(TokenResponse {
            valid: true,
            user_id: user.id,
            email: user.email,
            role: user.role,
        })),
        Err(err) => Err(AppError::Auth(err)),
    }
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;

    match jwt::validate_token(&token, &config.supabase_jwt_secret) {
        Ok(_) => Ok(Json(json!({ "valid": true }))),
        Err(_) => Ok(Json(json!({ "valid": false }))),
    }
}

/// Authenticated profile fetch from the auth provider.
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let user = jwt::validate_token(&token, &config.supabase_jwt_secret).map_err(AppError::Auth)?;
    debug!("Getting profile for user: {}", user.id);

    let client = SupabaseClient::new(&config);

    let auth_profile = client
        .get_user_profile(&token)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "user_id": user.id,
        "auth_profile": auth_profile
    })))
}
