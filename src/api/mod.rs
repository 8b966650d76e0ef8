//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod error;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

pub use error::ApiError;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/city", post(city_handler))
        .route("/coordinates", post(coordinates_handler))
        .route("/manual", post(manual_handler))
        .route("/schedule", delete(clear_handler))
        .route("/window", get(window_handler))
        .route("/countdown", get(countdown_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
