//! Collector payout calculation.
//!
//! Splits the money moved by one pickup request between the collector, the
//! platform and (for recyclables) the requesting user. Every function here is
//! a pure function of its arguments; persistence of the resulting breakdown
//! is the caller's job.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Collector share of the non-distance core at <= 5 km deadhead
pub const MIN_DEADHEAD_SHARE: f64 = 0.85;
/// Collector share of the non-distance core at >= 10 km deadhead
pub const MAX_DEADHEAD_SHARE: f64 = 0.92;

const DEADHEAD_FLOOR_KM: f64 = 5.0;
const DEADHEAD_CAP_KM: f64 = 10.0;

// Only the 5-10 km band of an urgent pickup's distance is ever billed
const BILLABLE_FLOOR_KM: f64 = 5.0;
const BILLABLE_CAP_KM: f64 = 10.0;

const URGENT_RATE: f64 = 0.30;
const URGENT_PER_KM_RATE: f64 = 0.06;

const COLLECTOR_URGENT_SHARE: f64 = 0.75;
const COLLECTOR_SURGE_SHARE: f64 = 0.75;
const COLLECTOR_RECYCLABLES_SHARE: f64 = 0.60;
const USER_RECYCLABLES_SHARE: f64 = 0.25;
const PLATFORM_RECYCLABLES_SHARE: f64 = 0.15;

fn default_surge_multiplier() -> f64 {
    1.0
}

fn default_request_fee() -> f64 {
    1.0
}

/// Named pricing inputs for one request, in currency units unless noted
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInput {
    /// Price from bin size/volume
    pub base: f64,
    /// On-site surcharges (contamination fee, wait-time fee)
    #[serde(default)]
    pub on_site: f64,
    /// Promotional deduction
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub urgent_enabled: bool,
    /// Collector's travel distance to the pickup, in km
    #[serde(default)]
    pub deadhead_km: f64,
    /// Portion of the pickup distance charged to the user, in km
    #[serde(default)]
    pub billed_km: f64,
    #[serde(default = "default_surge_multiplier")]
    pub surge_multiplier: f64,
    /// Flat platform fee, always charged to the user
    #[serde(default = "default_request_fee")]
    pub request_fee: f64,
    #[serde(default)]
    pub taxes: f64,
    /// Paid out to the collector in full
    #[serde(default)]
    pub tips: f64,
    /// Gross proceeds from the downstream recycler
    #[serde(default)]
    pub recycler_gross: f64,
    /// Collector cashback rate as a fraction, e.g. 0.02 for Gold
    #[serde(default)]
    pub loyalty_rate: f64,
}

impl PaymentInput {
    fn validate(&self) -> AppResult<()> {
        if !self.base.is_finite() || self.base <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "base must be a finite number greater than zero, got {}",
                self.base
            )));
        }
        require_non_negative("on_site", self.on_site)?;
        require_non_negative("discount", self.discount)?;
        require_non_negative("deadhead_km", self.deadhead_km)?;
        require_non_negative("billed_km", self.billed_km)?;
        require_non_negative("surge_multiplier", self.surge_multiplier)?;
        require_non_negative("request_fee", self.request_fee)?;
        require_non_negative("taxes", self.taxes)?;
        require_non_negative("tips", self.tips)?;
        require_non_negative("recycler_gross", self.recycler_gross)?;
        require_non_negative("loyalty_rate", self.loyalty_rate)?;
        if self.loyalty_rate > 1.0 {
            return Err(AppError::InvalidInput(format!(
                "loyalty_rate must be a fraction in [0, 1], got {}",
                self.loyalty_rate
            )));
        }
        Ok(())
    }
}

fn require_non_negative(name: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Itemized result of one payout calculation. Every intermediate amount is
/// exposed so callers can render a receipt or persist the record verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentBreakdown {
    // Charged to the user
    pub user_total: f64,
    pub taxes: f64,
    // Collector side
    pub collector_total: f64,
    pub collector_core: f64,
    pub collector_urgent: f64,
    pub collector_distance: f64,
    pub collector_surge: f64,
    pub collector_recyclables: f64,
    pub loyalty_cashback: f64,
    pub tips: f64,
    // Platform side
    pub app_bucket: f64,
    pub platform_core: f64,
    pub platform_urgent: f64,
    pub platform_surge: f64,
    pub platform_recyclables: f64,
    pub request_fee: f64,
    // Requester's cut of recyclable proceeds
    pub user_recyclables_share: f64,
    // Echoed intermediates
    pub non_distance_core: f64,
    pub urgent_amount: f64,
    pub distance_amount: f64,
    pub surge_uplift: f64,
    pub deadhead_share: f64,
    pub deadhead_km: f64,
    pub billed_km: f64,
    pub surge_multiplier: f64,
}

/// Collector share of the non-distance core, by deadhead distance.
///
/// Flat 0.85 up to 5 km, flat 0.92 from 10 km, linear in between. Collectors
/// travelling farther to reach a pickup keep a larger share of the base
/// price, capped at 10 km.
pub fn deadhead_share(deadhead_km: f64) -> f64 {
    if deadhead_km <= DEADHEAD_FLOOR_KM {
        MIN_DEADHEAD_SHARE
    } else if deadhead_km >= DEADHEAD_CAP_KM {
        MAX_DEADHEAD_SHARE
    } else {
        let t = (deadhead_km - DEADHEAD_FLOOR_KM) / (DEADHEAD_CAP_KM - DEADHEAD_FLOOR_KM);
        MIN_DEADHEAD_SHARE + t * (MAX_DEADHEAD_SHARE - MIN_DEADHEAD_SHARE)
    }
}

/// Billable portion of a pickup distance, in km.
///
/// Zero unless the request is urgent and the distance exceeds 5 km; distance
/// beyond 10 km is never charged further.
pub fn billed_distance(urgent_enabled: bool, distance_km: f64) -> f64 {
    if !urgent_enabled || distance_km <= BILLABLE_FLOOR_KM {
        return 0.0;
    }
    distance_km.min(BILLABLE_CAP_KM) - BILLABLE_FLOOR_KM
}

/// A distance quoted to the user may only decrease later in the flow, never
/// increase, even if a recomputation yields a larger number.
pub fn apply_only_down_rule(
    quoted_km: Option<f64>,
    accepted_km: Option<f64>,
    current_km: f64,
) -> f64 {
    let mut effective = current_km;
    if let Some(quoted) = quoted_km {
        effective = effective.min(quoted);
    }
    if let Some(accepted) = accepted_km {
        effective = effective.min(accepted);
    }
    effective
}

/// Split one pricing event between the user, the collector and the platform.
///
/// Validates before any arithmetic so a NaN or negative amount can never
/// flow into a payout figure.
pub fn calculate_payment_breakdown(input: &PaymentInput) -> AppResult<PaymentBreakdown> {
    input.validate()?;

    let non_distance_core = (input.base + input.on_site - input.discount).max(0.0);

    let urgent_amount = if input.urgent_enabled {
        URGENT_RATE * input.base
    } else {
        0.0
    };
    let per_km = if input.urgent_enabled {
        URGENT_PER_KM_RATE * input.base
    } else {
        0.0
    };
    let distance_amount = input.billed_km * per_km;

    let share = deadhead_share(input.deadhead_km);
    let collector_core = non_distance_core * share;
    let platform_core = non_distance_core - collector_core;

    let collector_urgent = COLLECTOR_URGENT_SHARE * urgent_amount;
    let platform_urgent = urgent_amount - collector_urgent;

    // Distance bonus passes through to the collector in full
    let collector_distance = distance_amount;

    let eligible_surge_base = non_distance_core + urgent_amount + distance_amount;
    let surge_uplift = ((input.surge_multiplier - 1.0) * eligible_surge_base).max(0.0);
    let collector_surge = COLLECTOR_SURGE_SHARE * surge_uplift;
    let platform_surge = surge_uplift - collector_surge;

    let collector_recyclables = COLLECTOR_RECYCLABLES_SHARE * input.recycler_gross;
    let user_recyclables_share = USER_RECYCLABLES_SHARE * input.recycler_gross;
    let platform_recyclables = PLATFORM_RECYCLABLES_SHARE * input.recycler_gross;

    let collector_pre_loyalty =
        collector_core + collector_urgent + collector_distance + collector_surge;
    let loyalty_cashback = input.loyalty_rate * collector_pre_loyalty;

    let collector_total =
        collector_pre_loyalty + loyalty_cashback + input.tips + collector_recyclables;
    let app_bucket =
        platform_core + platform_urgent + platform_surge + input.request_fee + platform_recyclables;
    let user_total =
        non_distance_core + urgent_amount + distance_amount + input.request_fee + input.taxes;

    Ok(PaymentBreakdown {
        user_total,
        taxes: input.taxes,
        collector_total,
        collector_core,
        collector_urgent,
        collector_distance,
        collector_surge,
        collector_recyclables,
        loyalty_cashback,
        tips: input.tips,
        app_bucket,
        platform_core,
        platform_urgent,
        platform_surge,
        platform_recyclables,
        request_fee: input.request_fee,
        user_recyclables_share,
        non_distance_core,
        urgent_amount,
        distance_amount,
        surge_uplift,
        deadhead_share: share,
        deadhead_km: input.deadhead_km,
        billed_km: input.billed_km,
        surge_multiplier: input.surge_multiplier,
    })
}

/// Request-shaped input for a pre-acceptance estimate.
///
/// Optional fields default the same way `PaymentInput` does. `distance_km`
/// is the raw pickup distance used to derive `billed_km` when the quote flow
/// has not already supplied one.
#[derive(Debug, Clone, Deserialize)]
pub struct PayoutEstimateRequest {
    pub base: f64,
    #[serde(default)]
    pub on_site: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub urgent_enabled: bool,
    #[serde(default = "default_surge_multiplier")]
    pub surge_multiplier: f64,
    #[serde(default = "default_request_fee")]
    pub request_fee: f64,
    #[serde(default)]
    pub taxes: f64,
    /// Raw pickup distance in km, if known
    #[serde(default)]
    pub distance_km: Option<f64>,
    /// Pre-reconciled billable distance, if already computed
    #[serde(default)]
    pub billed_km: Option<f64>,
}

/// A breakdown tagged as provisional
#[derive(Debug, Clone, Serialize)]
pub struct PayoutEstimate {
    pub is_estimate: bool,
    #[serde(flatten)]
    pub breakdown: PaymentBreakdown,
}

/// Pre-acceptance payout estimate for a collector at a given deadhead
/// distance. Tips, recycler proceeds and loyalty cashback are unknown before
/// completion and enter at zero.
pub fn estimate_collector_payout(
    request: &PayoutEstimateRequest,
    deadhead_km: f64,
) -> AppResult<PayoutEstimate> {
    if let Some(distance_km) = request.distance_km {
        require_non_negative("distance_km", distance_km)?;
    }

    let billed_km = match request.billed_km {
        Some(billed) => billed,
        None => billed_distance(request.urgent_enabled, request.distance_km.unwrap_or(0.0)),
    };

    let breakdown = calculate_payment_breakdown(&PaymentInput {
        base: request.base,
        on_site: request.on_site,
        discount: request.discount,
        urgent_enabled: request.urgent_enabled,
        deadhead_km,
        billed_km,
        surge_multiplier: request.surge_multiplier,
        request_fee: request.request_fee,
        taxes: request.taxes,
        tips: 0.0,
        recycler_gross: 0.0,
        loyalty_rate: 0.0,
    })?;

    Ok(PayoutEstimate {
        is_estimate: true,
        breakdown,
    })
}

/// Collector loyalty tier, derived from the cashback rate earned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoyaltyTier {
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 0.03 {
            LoyaltyTier::Platinum
        } else if rate >= 0.02 {
            LoyaltyTier::Gold
        } else {
            LoyaltyTier::Silver
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoyaltyTier::Silver => "Silver",
            LoyaltyTier::Gold => "Gold",
            LoyaltyTier::Platinum => "Platinum",
        }
    }
}

pub fn loyalty_tier_name(rate: f64) -> &'static str {
    LoyaltyTier::from_rate(rate).name()
}
