//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{extract::State, response::Json};
use tracing::{info, warn};

use crate::{
    services::{load_for_city, load_for_coordinates, load_manual},
    state::AppState,
};
use super::{
    error::ApiError,
    responses::{
        ApiResponse, CityRequest, CoordinatesRequest, CountdownResponse, HealthResponse,
        ManualTimesRequest, StatusResponse, WindowResponse,
    },
};

/// Handle POST /city - Resolve a city and load its prayer times
pub async fn city_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CityRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let schedule = load_for_city(
        state.resolver.as_ref(),
        state.prayer_provider.as_ref(),
        state.clock.as_ref(),
        &request.city,
    )
    .await
    .map_err(|e| {
        warn!("City lookup for {:?} failed: {}", request.city, e);
        e
    })?;

    let schedule = state.set_schedule("city", schedule)?;
    let city = schedule
        .location
        .as_ref()
        .map(|l| format!("{}, {}", l.city, l.country))
        .unwrap_or_else(|| request.city.clone());
    info!("City endpoint called - schedule loaded for {}", city);

    Ok(Json(ApiResponse::scheduled(
        format!("Prayer times loaded for {}", city),
        schedule,
    )))
}

/// Handle POST /coordinates - Load prayer times for a coordinate pair
pub async fn coordinates_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CoordinatesRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let schedule = load_for_coordinates(
        state.resolver.as_ref(),
        state.prayer_provider.as_ref(),
        state.clock.as_ref(),
        request.latitude,
        request.longitude,
    )
    .await
    .map_err(|e| {
        warn!("Lookup for {}, {} failed: {}", request.latitude, request.longitude, e);
        e
    })?;

    let schedule = state.set_schedule("coordinates", schedule)?;
    info!("Coordinates endpoint called - schedule loaded");

    Ok(Json(ApiResponse::scheduled(
        format!("Prayer times loaded for {}, {}", request.latitude, request.longitude),
        schedule,
    )))
}

/// Handle POST /manual - Use hand-entered Maghrib and Fajr
pub async fn manual_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ManualTimesRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let schedule = load_manual(state.clock.as_ref(), &request.maghrib, &request.fajr)?;
    let schedule = state.set_schedule("manual", schedule)?;
    info!("Manual endpoint called - schedule set from entered times");

    Ok(Json(ApiResponse::scheduled(
        "Manual prayer times set".to_string(),
        schedule,
    )))
}

/// Handle DELETE /schedule - Stop counting down
pub async fn clear_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    state.clear_schedule("clear")?;
    info!("Clear endpoint called - schedule removed");
    Ok(Json(ApiResponse::cleared("Schedule cleared".to_string())))
}

/// Handle GET /window - Current Tahajjud window
pub async fn window_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WindowResponse>, ApiError> {
    let schedule = state.get_schedule()?.ok_or(ApiError::NoSchedule)?;
    Ok(Json(WindowResponse::from(&schedule)))
}

/// Handle GET /countdown - Time left until the next window boundary
pub async fn countdown_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountdownResponse>, ApiError> {
    let countdown = state.get_countdown()?.ok_or(ApiError::NoSchedule)?;
    Ok(Json(CountdownResponse::from(countdown)))
}

/// Handle GET /status - Return current status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let schedule = state.get_schedule()?;
    let countdown = state.get_countdown()?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        schedule,
        countdown: countdown.map(CountdownResponse::from),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
