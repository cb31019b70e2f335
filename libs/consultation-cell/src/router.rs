use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, ConsultationState};

pub fn consultation_routes(state: Arc<AppConfig>) -> Router {
    let consultation_state = Arc::new(ConsultationState::new(state.clone()));

    Router::new()
        .route("/queue", get(handlers::get_queue))
        .route("/start", post(handlers::start_consultation))
        .route("/rooms", get(handlers::list_rooms))
        .route("/rooms/{room_id}/end", post(handlers::end_consultation))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
        .with_state(consultation_state)
}
