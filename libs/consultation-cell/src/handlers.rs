use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;

use crate::models::{
    ConsultationError, ConsultationRoom, QueueQuery, ScheduleContext, StartConsultationRequest,
};
use crate::services::queue::ConsultationQueueService;
use crate::services::scheduler;

/// Router-owned state: the config plus the in-memory room list.
/// Rooms are a per-process convenience structure, not a system of record.
pub struct ConsultationState {
    pub config: Arc<AppConfig>,
    pub rooms: RwLock<Vec<ConsultationRoom>>,
}

impl ConsultationState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            rooms: RwLock::new(Vec::new()),
        }
    }
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::PatientNotFound(_) | ConsultationError::RoomNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            ConsultationError::PatientNotWaiting { .. } => AppError::Conflict(err.to_string()),
            ConsultationError::StoreError(msg) => AppError::ExternalService(msg),
        }
    }
}

/// The doctor's consultation queue, filtered by the matcher.
pub async fn get_queue(
    State(state): State<Arc<ConsultationState>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Query(query): Query<QueueQuery>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let queue_service = ConsultationQueueService::new(&state.config);
    let patients = queue_service.fetch_queue(&user.id, &token).await?;

    let rooms = state.rooms.read().await.clone();

    let context = ScheduleContext {
        search_term: query.search_term.unwrap_or_default(),
        filter_status: query.filter_status.unwrap_or_default(),
        current_time: Utc::now(),
    };

    let outcome = scheduler::schedule(&patients, &rooms, &context);

    Ok(Json(json!({
        "scheduled_patients": outcome.scheduled_patients,
        "rooms": outcome.new_rooms,
        "total": outcome.scheduled_patients.len()
    })))
}

/// Start a consultation: promote the waiting patient, append a room, and
/// push the status change to the store.
pub async fn start_consultation(
    State(state): State<Arc<ConsultationState>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<StartConsultationRequest>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let queue_service = ConsultationQueueService::new(&state.config);
    let patients = queue_service.fetch_queue(&user.id, &token).await?;

    let mut rooms = state.rooms.write().await;

    let started =
        scheduler::start_consultation(&patients, &rooms, &request.patient_id, Utc::now())?;

    queue_service
        .update_appointment_status(&request.patient_id, "in_progress", &token)
        .await?;

    *rooms = started.rooms.clone();

    info!(
        "Doctor {} started consultation {} for patient {}",
        user.id, started.room.id, request.patient_id
    );

    Ok(Json(json!({
        "room": started.room,
        "patients": started.patients,
        "rooms": started.rooms
    })))
}

/// End a consultation: mark the appointment completed and drop the room.
pub async fn end_consultation(
    State(state): State<Arc<ConsultationState>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let token = extract_bearer_token(&headers)?;

    let mut rooms = state.rooms.write().await;

    let position = rooms
        .iter()
        .position(|room| room.id == room_id)
        .ok_or_else(|| AppError::from(ConsultationError::RoomNotFound(room_id.clone())))?;

    let queue_service = ConsultationQueueService::new(&state.config);
    queue_service
        .update_appointment_status(&rooms[position].patient_id, "completed", &token)
        .await?;

    let room = rooms.remove(position);

    info!(
        "Doctor {} ended consultation {} for patient {}",
        user.id, room.id, room.patient_id
    );

    Ok(Json(json!({
        "success": true,
        "room_id": room.id,
        "patient_id": room.patient_id
    })))
}

/// Current in-memory room list.
pub async fn list_rooms(
    State(state): State<Arc<ConsultationState>>,
) -> Result<Json<Value>, AppError> {
    let rooms = state.rooms.read().await.clone();

    Ok(Json(json!({
        "rooms": rooms,
        "total": rooms.len()
    })))
}
