use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;

use crate::models::{
    ApplicationStatus, DoctorError, DoctorSearchFilters, ReviewApplicationRequest,
    SubmitApplicationRequest,
};
use crate::services::application::ApplicationService;
use crate::services::doctor::DoctorService;

#[derive(Debug, Deserialize)]
pub struct DoctorSearchQuery {
    pub specialty: Option<String>,
    pub min_experience: Option<i32>,
    pub min_rating: Option<f32>,
    pub is_verified_only: Option<bool>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<ApplicationStatus>,
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound | DoctorError::ApplicationNotFound => {
                AppError::NotFound(err.to_string())
            }
            DoctorError::AlreadyReviewed(_) | DoctorError::DuplicateApplication => {
                AppError::Conflict(err.to_string())
            }
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::StoreError(msg) => AppError::ExternalService(msg),
        }
    }
}

fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Admin role required to review applications".to_string(),
        ))
    }
}

// ==============================================================================
// PUBLIC DISCOVERY HANDLERS
// ==============================================================================

pub async fn search_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let filters = DoctorSearchFilters {
        specialty: query.specialty,
        min_experience: query.min_experience,
        min_rating: query.min_rating,
        // Public discovery only surfaces credentialed doctors by default.
        is_verified_only: Some(query.is_verified_only.unwrap_or(true)),
    };

    let doctors = doctor_service
        .search_doctors(filters, &state.supabase_anon_key, query.limit, query.offset)
        .await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service
        .get_doctor(&doctor_id, &state.supabase_anon_key)
        .await?;

    Ok(Json(json!(doctor)))
}

// ==============================================================================
// APPLICATION REVIEW HANDLERS (AUTHENTICATED)
// ==============================================================================

pub async fn submit_application(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<SubmitApplicationRequest>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;
    let application_service = ApplicationService::new(&state);

    let application = application_service.submit(request, &user, &token).await?;

    Ok(Json(json!({
        "application": application,
        "message": "Application submitted for review"
    })))
}

pub async fn list_applications(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Query(query): Query<ApplicationListQuery>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let token = extract_bearer_token(&headers)?;

    let application_service = ApplicationService::new(&state);
    let applications = application_service.list(query.status, &token).await?;

    Ok(Json(json!({
        "applications": applications,
        "total": applications.len()
    })))
}

pub async fn approve_application(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(request): Json<ReviewApplicationRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let token = extract_bearer_token(&headers)?;

    let application_service = ApplicationService::new(&state);
    let doctor = application_service
        .approve(&application_id, request, &user, &token)
        .await?;

    Ok(Json(json!({
        "doctor": doctor,
        "message": "Application approved; doctor profile created"
    })))
}

pub async fn reject_application(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(request): Json<ReviewApplicationRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let token = extract_bearer_token(&headers)?;

    let application_service = ApplicationService::new(&state);
    let application = application_service
        .reject(&application_id, request, &user, &token)
        .await?;

    Ok(Json(json!({
        "application": application,
        "message": "Application rejected"
    })))
}
