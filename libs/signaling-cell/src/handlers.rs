use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    response::Response,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;

use crate::services::relay;
use crate::services::room::RoomRegistry;

/// Router-owned state: the config plus the live room registry.
pub struct SignalingState {
    pub config: Arc<AppConfig>,
    pub registry: RoomRegistry,
}

impl SignalingState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            registry: RoomRegistry::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// Upgrade to a signaling WebSocket for the named consultation room.
/// Browser WebSocket clients cannot set an Authorization header, so the
/// token rides in the query string and is validated before the upgrade.
pub async fn room_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<SignalingState>>,
    Path(room_id): Path<String>,
    Query(query): Query<WsQuery>,
) -> Result<Response, AppError> {
    let user =
        validate_token(&query.token, &state.config.supabase_jwt_secret).map_err(AppError::Auth)?;

    info!("User {} joining signaling room {}", user.id, room_id);

    Ok(ws.on_upgrade(move |socket| relay::run_session(state, socket, room_id, user)))
}

/// Live rooms with their connected peers.
pub async fn list_rooms(
    State(state): State<Arc<SignalingState>>,
) -> Result<Json<Value>, AppError> {
    let rooms = state.registry.snapshots().await;

    Ok(Json(json!({
        "rooms": rooms,
        "total": rooms.len()
    })))
}
