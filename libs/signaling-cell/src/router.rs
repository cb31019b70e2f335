use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, SignalingState};

pub fn signaling_routes(state: Arc<AppConfig>) -> Router {
    let signaling_state = Arc::new(SignalingState::new(state.clone()));

    // The WebSocket route authenticates via query token inside the handler;
    // the room listing goes through the regular bearer middleware.
    let ws_routes = Router::new()
        .route("/rooms/{room_id}/ws", get(handlers::room_ws))
        .with_state(signaling_state.clone());

    let protected_routes = Router::new()
        .route("/rooms", get(handlers::list_rooms))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
        .with_state(signaling_state);

    Router::new().merge(ws_routes).merge(protected_routes)
}
