use axum::{extract::Query, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::utils::payout::{
    apply_only_down_rule, billed_distance, calculate_payment_breakdown, estimate_collector_payout,
    loyalty_tier_name, PaymentBreakdown, PaymentInput, PayoutEstimate, PayoutEstimateRequest,
};

// ============ Settlement ============

#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    /// Identity for the audit record the caller persists
    pub breakdown_id: Uuid,
    pub computed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub breakdown: PaymentBreakdown,
}

/// Compute the full settlement breakdown for a request
pub async fn breakdown(Json(payload): Json<PaymentInput>) -> AppResult<Json<BreakdownResponse>> {
    let breakdown = calculate_payment_breakdown(&payload)?;

    tracing::debug!(
        collector_total = breakdown.collector_total,
        app_bucket = breakdown.app_bucket,
        user_total = breakdown.user_total,
        "Computed payment breakdown"
    );

    Ok(Json(BreakdownResponse {
        breakdown_id: Uuid::new_v4(),
        computed_at: Utc::now(),
        breakdown,
    }))
}

// ============ Pre-acceptance estimate ============

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    /// Collector's travel distance to the pickup, in km
    pub deadhead_km: f64,
    #[serde(flatten)]
    pub request: PayoutEstimateRequest,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub computed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub estimate: PayoutEstimate,
}

/// Estimate a collector's payout before accepting an assignment
pub async fn estimate(Json(payload): Json<EstimateRequest>) -> AppResult<Json<EstimateResponse>> {
    let estimate = estimate_collector_payout(&payload.request, payload.deadhead_km)?;

    Ok(Json(EstimateResponse {
        computed_at: Utc::now(),
        estimate,
    }))
}

// ============ Distance reconciliation ============

#[derive(Debug, Deserialize)]
pub struct BilledDistanceRequest {
    #[serde(default)]
    pub urgent_enabled: bool,
    /// Distance computed now, in km
    pub current_km: f64,
    /// Distance shown to the user at quote time, if any
    #[serde(default)]
    pub quoted_km: Option<f64>,
    /// Distance recomputed at acceptance time, if any
    #[serde(default)]
    pub accepted_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct BilledDistanceResponse {
    /// Distance after the only-down reconciliation
    pub effective_km: f64,
    /// Portion of the effective distance that is billable
    pub billed_km: f64,
}

/// Reconcile quote-flow distances and derive the billable portion
pub async fn billed(
    Json(payload): Json<BilledDistanceRequest>,
) -> AppResult<Json<BilledDistanceResponse>> {
    let anchors = [
        ("current_km", Some(payload.current_km)),
        ("quoted_km", payload.quoted_km),
        ("accepted_km", payload.accepted_km),
    ];
    for (name, value) in anchors {
        if let Some(km) = value {
            if !km.is_finite() || km < 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, km
                )));
            }
        }
    }

    let effective_km =
        apply_only_down_rule(payload.quoted_km, payload.accepted_km, payload.current_km);
    let billed_km = billed_distance(payload.urgent_enabled, effective_km);

    Ok(Json(BilledDistanceResponse {
        effective_km,
        billed_km,
    }))
}

// ============ Loyalty ============

#[derive(Debug, Deserialize)]
pub struct LoyaltyTierQuery {
    pub rate: f64,
}

#[derive(Debug, Serialize)]
pub struct LoyaltyTierResponse {
    pub rate: f64,
    pub tier: &'static str,
}

/// Look up the loyalty tier for a cashback rate
pub async fn loyalty_tier(
    Query(query): Query<LoyaltyTierQuery>,
) -> AppResult<Json<LoyaltyTierResponse>> {
    if !query.rate.is_finite() || query.rate < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "rate must be a finite non-negative fraction, got {}",
            query.rate
        )));
    }

    Ok(Json(LoyaltyTierResponse {
        rate: query.rate,
        tier: loyalty_tier_name(query.rate),
    }))
}
