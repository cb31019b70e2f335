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

use crate::models::{AssessmentError, SubmitAssessmentRequest};
use crate::services::assessment::AssessmentService;

impl From<AssessmentError> for AppError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::NotFound => AppError::NotFound(err.to_string()),
            AssessmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AssessmentError::StoreError(msg) => AppError::ExternalService(msg),
        }
    }
}

pub async fn submit_assessment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<SubmitAssessmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let assessment_service = AssessmentService::new(&state);
    let assessment = assessment_service.submit(request, &user, &token).await?;

    Ok(Json(json!({
        "assessment": assessment,
        "message": "Assessment recorded"
    })))
}

pub async fn get_assessment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(assessment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let assessment_service = AssessmentService::new(&state);
    let assessment = assessment_service.get(&assessment_id, &token).await?;

    if assessment.patient_id != user.id && !user.is_doctor() && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot access another patient's assessment".to_string(),
        ));
    }

    Ok(Json(json!(assessment)))
}

pub async fn list_patient_assessments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if patient_id != user.id && !user.is_doctor() && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot access another patient's assessments".to_string(),
        ));
    }

    let token = extract_bearer_token(&headers)?;

    let assessment_service = AssessmentService::new(&state);
    let assessments = assessment_service.list_for_patient(&patient_id, &token).await?;

    Ok(Json(json!({
        "assessments": assessments,
        "total": assessments.len()
    })))
}
