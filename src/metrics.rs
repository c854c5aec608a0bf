//! Local projection of retention-strategy impact.
//!
//! The backend optimizer is the authority on per-strategy metrics, but it
//! only runs on demand. Until it has, each strategy's expected footprint is
//! projected locally from a fixed tier effect model. `merge_projection` is
//! the one place where authoritative values take precedence, field by field.

use crate::api::types::{PriorityTier, StrategyMetrics};

/// Average churn probability inside a targeted segment.
pub const AVG_RISK_PROBABILITY: f64 = 0.45;
/// Average annual revenue per retained customer.
pub const AVG_CUSTOMER_REVENUE: f64 = 500.0;

/// Fixed per-tier assumptions: what share of the segment a strategy reaches,
/// how much it lifts retention among the reached, and what it costs per head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierEffect {
    pub reach: f64,
    pub lift: f64,
    pub cost_per_customer: f64,
}

impl TierEffect {
    pub fn for_tier(tier: PriorityTier) -> Self {
        match tier {
            PriorityTier::Critical => TierEffect { reach: 0.08, lift: 0.40, cost_per_customer: 25.0 },
            PriorityTier::High => TierEffect { reach: 0.15, lift: 0.30, cost_per_customer: 15.0 },
            PriorityTier::Medium => TierEffect { reach: 0.25, lift: 0.18, cost_per_customer: 8.0 },
        }
    }
}

/// Projected footprint of one strategy over one segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Projection {
    pub targeted_customers: f64,
    pub prevented_churners: f64,
    pub estimated_cost: f64,
    pub net_impact: f64,
}

impl Projection {
    pub fn add(&mut self, other: Projection) {
        self.targeted_customers += other.targeted_customers;
        self.prevented_churners += other.prevented_churners;
        self.estimated_cost += other.estimated_cost;
        self.net_impact += other.net_impact;
    }
}

/// Pure local projection. A zero or unknown segment size projects to all
/// zeros, never NaN.
pub fn project(tier: PriorityTier, total_customers: u64) -> Projection {
    let effect = TierEffect::for_tier(tier);
    let targeted = (total_customers as f64 * effect.reach).round();
    let prevented = targeted * AVG_RISK_PROBABILITY * effect.lift;
    let cost = targeted * effect.cost_per_customer;
    Projection {
        targeted_customers: targeted,
        prevented_churners: prevented,
        estimated_cost: cost,
        net_impact: prevented * AVG_CUSTOMER_REVENUE - cost,
    }
}

/// Field-by-field precedence: an authoritative value wins wherever the
/// optimizer supplied one; every absent field keeps the local projection.
pub fn merge_projection(local: Projection, authoritative: Option<&StrategyMetrics>) -> Projection {
    match authoritative {
        None => local,
        Some(auth) => Projection {
            targeted_customers: auth.targeted_customers.unwrap_or(local.targeted_customers),
            prevented_churners: auth.prevented_churners.unwrap_or(local.prevented_churners),
            estimated_cost: auth.estimated_cost.unwrap_or(local.estimated_cost),
            net_impact: auth.estimated_net_impact.unwrap_or(local.net_impact),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
