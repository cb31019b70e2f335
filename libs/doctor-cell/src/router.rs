use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    // Public discovery (no authentication required)
    let public_routes = Router::new()
        .route("/search", get(handlers::search_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor));

    // Application review workflow (authentication required)
    let protected_routes = Router::new()
        .route("/applications", post(handlers::submit_application))
        .route("/applications", get(handlers::list_applications))
        .route("/applications/{application_id}/approve", post(handlers::approve_application))
        .route("/applications/{application_id}/reject", post(handlers::reject_application))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
