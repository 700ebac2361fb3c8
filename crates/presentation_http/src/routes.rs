//! Route definitions

use axum::{Router, routing::get};

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Roster API
        .route("/classes", get(handlers::classes::list_classes))
        .route("/rooster/{class_code}", get(handlers::roster::get_roster))
        .fallback(handlers::not_found)
        // Attach state
        .with_state(state)
}
