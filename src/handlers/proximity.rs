use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::utils::geo::{distance_meters, is_within_radius, nearest_neighbor_route, Coordinate};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DistanceRequest {
    pub from: Coordinate,
    pub to: Coordinate,
}

#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub meters: f64,
}

/// Great-circle distance between two points
pub async fn distance(Json(payload): Json<DistanceRequest>) -> AppResult<Json<DistanceResponse>> {
    let meters = distance_meters(payload.from, payload.to)?;
    Ok(Json(DistanceResponse { meters }))
}

// ============ Completion gating ============

#[derive(Debug, Deserialize)]
pub struct CompletionCheckRequest {
    /// Collector's reported position
    pub collector: Coordinate,
    /// Location the pickup request was filed at
    pub target: Coordinate,
    /// Override for the configured completion radius, in meters
    #[serde(default)]
    pub radius_m: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CompletionCheckResponse {
    pub within: bool,
    pub distance_m: f64,
    pub radius_m: f64,
}

/// Check whether a collector is close enough to mark a pickup complete
pub async fn completion_check(
    State(state): State<AppState>,
    Json(payload): Json<CompletionCheckRequest>,
) -> AppResult<Json<CompletionCheckResponse>> {
    let radius_m = payload.radius_m.unwrap_or(state.config.completion_radius_m);
    let distance_m = distance_meters(payload.collector, payload.target)?;
    let within = is_within_radius(payload.collector, payload.target, radius_m)?;

    if !within {
        tracing::debug!(distance_m, radius_m, "Completion gate rejected");
    }

    Ok(Json(CompletionCheckResponse {
        within,
        distance_m,
        radius_m,
    }))
}

// ============ Route ordering ============

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    /// Collector's starting position
    pub start: Coordinate,
    /// Unordered pickup stops for the shift
    pub stops: Vec<Coordinate>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub ordered: Vec<Coordinate>,
}

/// Order a collector's stops by repeated nearest-neighbor
pub async fn route_order(Json(payload): Json<RouteRequest>) -> AppResult<Json<RouteResponse>> {
    let ordered = nearest_neighbor_route(&payload.stops, payload.start)?;
    Ok(Json(RouteResponse { ordered }))
}
