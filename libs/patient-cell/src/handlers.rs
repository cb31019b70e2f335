use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;

use crate::models::{PatientError, UpdatePatientRequest};
use crate::services::patient::PatientService;

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::StoreError(msg) => AppError::ExternalService(msg),
        }
    }
}

pub async fn get_my_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let patient_service = PatientService::new(&state);
    let patient = patient_service.get_patient(&user.id, &token).await?;

    Ok(Json(json!(patient)))
}

pub async fn update_my_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let patient_service = PatientService::new(&state);
    let patient = patient_service.update_patient(&user.id, request, &token).await?;

    Ok(Json(json!({
        "patient": patient,
        "message": "Profile updated"
    })))
}

/// Clinician access to a patient's demographics.
pub async fn get_patient(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() && !user.is_admin() && user.id != patient_id {
        return Err(AppError::Forbidden(
            "Cannot access another patient's profile".to_string(),
        ));
    }

    let token = extract_bearer_token(&headers)?;

    let patient_service = PatientService::new(&state);
    let patient = patient_service.get_patient(&patient_id, &token).await?;

    Ok(Json(json!(patient)))
}
