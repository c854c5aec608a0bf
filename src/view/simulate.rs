//! Simulation pages (ROI, A/B): explicit runs, no fetch on page entry.
//!
//! Unlike the fetch-on-load views, a simulator keeps its last completed
//! result visible while a new run is pending, and a failed run leaves the
//! previous result in place next to the error. Results never refresh on
//! their own; `is_stale()` reports when the current parameters drifted from
//! the ones the last result was computed with.

use crate::api::types::{AbOutcome, AbRequest, RoiOutcome, RoiRequest};
use crate::api::{ApiError, ApiResult};
use crate::domain::DomainId;
use crate::logging;

use super::{RequestGuard, RequestToken};

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RoiParams {
    pub avg_revenue: f64,
    pub offer_cost: f64,
    pub churn_reduction_pct: f64,
}

impl Default for RoiParams {
    fn default() -> Self {
        Self { avg_revenue: 500.0, offer_cost: 50.0, churn_reduction_pct: 30.0 }
    }
}

impl RoiParams {
    pub fn to_request(&self, domain: DomainId) -> RoiRequest {
        RoiRequest {
            avg_revenue: self.avg_revenue,
            offer_cost: self.offer_cost,
            churn_reduction_pct: self.churn_reduction_pct,
            domain,
        }
    }

    /// Deterministic key for audit correlation of reruns.
    pub fn params_key(&self, domain: DomainId) -> String {
        format!(
            "roi:{}:{}:{}:{}",
            self.avg_revenue, self.offer_cost, self.churn_reduction_pct, domain
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbParams {
    pub churn_reduction_pct: f64,
}

impl Default for AbParams {
    fn default() -> Self {
        Self { churn_reduction_pct: 30.0 }
    }
}

impl AbParams {
    pub fn to_request(&self, domain: DomainId) -> AbRequest {
        AbRequest { churn_reduction_pct: self.churn_reduction_pct, domain }
    }

    pub fn params_key(&self, domain: DomainId) -> String {
        format!("ab:{}:{}", self.churn_reduction_pct, domain)
    }
}

// =============================================================================
// Simulator
// =============================================================================

#[derive(Debug)]
pub enum SimPhase {
    Idle,
    Running,
    Failed(ApiError),
}

impl SimPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SimPhase::Idle => "idle",
            SimPhase::Running => "running",
            SimPhase::Failed(_) => "failed",
        }
    }
}

/// A completed run: the outcome plus the exact parameters it answers.
#[derive(Debug)]
pub struct CompletedRun<P, R> {
    pub params: P,
    pub outcome: R,
}

#[derive(Debug)]
pub struct Simulator<P, R> {
    view: &'static str,
    guard: RequestGuard,
    params: P,
    phase: SimPhase,
    last: Option<CompletedRun<P, R>>,
}

impl<P: Clone + PartialEq, R> Simulator<P, R> {
    pub fn new(view: &'static str, params: P) -> Self {
        Self {
            view,
            guard: RequestGuard::new(),
            params,
            phase: SimPhase::Idle,
            last: None,
        }
    }

    pub fn params(&self) -> &P {
        &self.params
    }

    pub fn set_params(&mut self, params: P) {
        self.params = params;
    }

    pub fn phase(&self) -> &SimPhase {
        &self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, SimPhase::Running)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.phase {
            SimPhase::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Last completed result; stays visible through reruns and failures.
    pub fn last(&self) -> Option<&CompletedRun<P, R>> {
        self.last.as_ref()
    }

    /// True when the current parameters differ from those of the last
    /// completed run. Never true before the first result.
    pub fn is_stale(&self) -> bool {
        self.last.as_ref().map(|run| run.params != self.params).unwrap_or(false)
    }

    pub fn superseded(&self) -> u64 {
        self.guard.superseded()
    }

    /// Starts a run, snapshotting the parameters it will answer.
    pub fn begin_run(&mut self) -> (RequestToken, P) {
        let from = self.phase.name();
        self.phase = SimPhase::Running;
        logging::log_view_transition(self.view, from, "running");
        (self.guard.begin(), self.params.clone())
    }

    /// Applies a run outcome if `token` is still current.
    pub fn finish_run(&mut self, token: RequestToken, params: P, result: ApiResult<R>) -> bool {
        if !self.guard.is_current(token) {
            self.guard.note_superseded();
            logging::log_supersession(self.view, token.value(), self.guard.latest());
            logging::agg_increment("supersession");
            return false;
        }
        match result {
            Ok(outcome) => {
                self.phase = SimPhase::Idle;
                self.last = Some(CompletedRun { params, outcome });
                logging::agg_increment("simulation");
                logging::log_view_transition(self.view, "running", "idle");
            }
            Err(err) => {
                self.phase = SimPhase::Failed(err);
                logging::log_view_transition(self.view, "running", "failed");
            }
        }
        true
    }

    /// Domain switch: a result computed for another dataset is meaningless,
    /// so the last run is dropped along with any pending one.
    pub fn invalidate(&mut self) {
        self.guard.begin();
        self.phase = SimPhase::Idle;
        self.last = None;
    }
}

pub type RoiSimulator = Simulator<RoiParams, RoiOutcome>;
pub type AbSimulator = Simulator<AbParams, AbOutcome>;

impl RoiSimulator {
    pub fn roi() -> Self {
        Simulator::new("roi_simulator", RoiParams::default())
    }
}

impl AbSimulator {
    pub fn ab() -> Self {
        Simulator::new("ab_testing", AbParams::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
