use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{payout, proximity};
use crate::middleware::rate_limit::create_public_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Create IP-based governor for public routes
    let public_governor = create_public_governor();

    // Payout routes (quote, estimate, settlement)
    let payout_routes = Router::new()
        .route("/breakdown", post(payout::breakdown))
        .route("/estimate", post(payout::estimate))
        .route("/billed-distance", post(payout::billed))
        .route("/loyalty-tier", get(payout::loyalty_tier))
        .layer(public_governor.clone());

    // Geo routes (distance, completion gating, route ordering)
    let geo_routes = Router::new()
        .route("/distance", post(proximity::distance))
        .route("/completion-check", post(proximity::completion_check))
        .route("/route", post(proximity::route_order))
        .layer(public_governor);

    // Combine all routes
    Router::new()
        .nest("/api/payouts", payout_routes)
        .nest("/api/geo", geo_routes)
        .with_state(state)
}
