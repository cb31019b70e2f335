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

use crate::models::{AppointmentError, CreateAppointmentRequest, UpdateStatusRequest};
use crate::services::booking::AppointmentBookingService;

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::DoctorUnavailable => AppError::BadRequest(err.to_string()),
            AppointmentError::SlotConflict | AppointmentError::IllegalTransition { .. } => {
                AppError::Conflict(err.to_string())
            }
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::StoreError(msg) => AppError::ExternalService(msg),
        }
    }
}

/// Patients may only read their own appointments; clinicians and admins may
/// read any.
fn check_list_access(user: &User, owner_id: &str) -> Result<(), AppError> {
    if user.id == owner_id || user.is_doctor() || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Cannot access another patient's appointments".to_string(),
        ))
    }
}

pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service.book(request, &user, &token).await?;

    Ok(Json(json!({
        "appointment": appointment,
        "message": "Appointment booked"
    })))
}

pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service.get(&appointment_id, &token).await?;

    check_list_access(&user, &appointment.patient_id.to_string())?;

    Ok(Json(json!(appointment)))
}

pub async fn list_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    check_list_access(&user, &patient_id)?;
    let token = extract_bearer_token(&headers)?;

    let booking_service = AppointmentBookingService::new(&state);
    let appointments = booking_service.list_for_patient(&patient_id, &token).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

pub async fn list_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Doctor role required to list a doctor's appointments".to_string(),
        ));
    }
    let token = extract_bearer_token(&headers)?;

    let booking_service = AppointmentBookingService::new(&state);
    let appointments = booking_service.list_for_doctor(&doctor_id, &token).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let booking_service = AppointmentBookingService::new(&state);
    let current = booking_service.get(&appointment_id, &token).await?;
    check_list_access(&user, &current.patient_id.to_string())?;

    let appointment = booking_service
        .update_status(&appointment_id, request.status, &token)
        .await?;

    Ok(Json(json!({
        "appointment": appointment,
        "message": "Status updated"
    })))
}
