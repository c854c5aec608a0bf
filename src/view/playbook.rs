//! Retention Playbook page: strategy rows with local projections, an
//! enabled-strategy set, and the backend-optimizer overlay.
//!
//! Strategy identity is the zero-based index in the received playbook
//! ordering. The overlay holds authoritative metrics exactly as the
//! optimizer returned them; precedence over local projections is decided in
//! `metrics::merge_projection`, nowhere else.

use std::collections::HashMap;

use crate::api::types::{
    KpiSnapshot, OptimizeResponse, RetentionPlaybook, Strategy, StrategyMetrics,
};
use crate::api::{ApiError, ApiResult, Backend};
use crate::domain::DomainId;
use crate::metrics::{merge_projection, project, Projection};

use super::{LoadState, RequestToken, ViewSlot};

#[derive(Debug)]
pub struct PlaybookModel {
    strategies: Vec<Strategy>,
    enabled: Vec<bool>,
    overlay: HashMap<usize, StrategyMetrics>,
    pub segment_total: u64,
    pub optimizing: bool,
    pub optimizer_error: Option<ApiError>,
}

impl PlaybookModel {
    /// Fresh model: only the first strategy starts enabled.
    pub fn assemble(playbook: RetentionPlaybook, kpis: &KpiSnapshot) -> Self {
        let mut enabled = vec![false; playbook.strategies.len()];
        if let Some(first) = enabled.first_mut() {
            *first = true;
        }
        Self {
            strategies: playbook.strategies,
            enabled,
            overlay: HashMap::new(),
            segment_total: kpis.total_customers,
            optimizing: false,
            optimizer_error: None,
        }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.enabled.get(index).copied().unwrap_or(false)
    }

    pub fn enabled_indices(&self) -> Vec<usize> {
        self.enabled
            .iter()
            .enumerate()
            .filter_map(|(i, on)| on.then_some(i))
            .collect()
    }

    /// Flip one strategy; out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if let Some(on) = self.enabled.get_mut(index) {
            *on = !*on;
        }
    }

    pub fn authoritative(&self, index: usize) -> Option<&StrategyMetrics> {
        self.overlay.get(&index)
    }

    pub fn local_projection(&self, index: usize) -> Option<Projection> {
        self.strategies
            .get(index)
            .map(|s| project(s.priority, self.segment_total))
    }

    /// Local projection with any authoritative fields layered on top.
    pub fn effective_projection(&self, index: usize) -> Option<Projection> {
        self.local_projection(index)
            .map(|local| merge_projection(local, self.overlay.get(&index)))
    }

    /// Portfolio totals over enabled strategies only.
    pub fn totals(&self) -> Projection {
        let mut total = Projection::default();
        for index in 0..self.strategies.len() {
            if self.is_enabled(index) {
                if let Some(effective) = self.effective_projection(index) {
                    total.add(effective);
                }
            }
        }
        total
    }

    /// Applies an optimizer result: the enabled set becomes exactly the
    /// backend selection and the whole overlay is replaced.
    pub fn apply_optimizer(&mut self, resp: OptimizeResponse) {
        let n = self.strategies.len();
        self.enabled = vec![false; n];
        for id in resp.selected_strategy_ids {
            if id < n {
                self.enabled[id] = true;
            }
        }
        self.overlay = resp
            .strategy_metrics
            .into_iter()
            .filter(|m| m.strategy_id < n)
            .map(|m| (m.strategy_id, m))
            .collect();
        self.optimizer_error = None;
    }
}

#[derive(Debug)]
pub struct PlaybookController {
    slot: ViewSlot<PlaybookModel>,
}

impl PlaybookController {
    pub fn new() -> Self {
        Self { slot: ViewSlot::new("retention_playbook") }
    }

    /// The KPI call rides along to supply the segment total the projections
    /// need.
    pub async fn fetch(backend: &dyn Backend, domain: DomainId) -> ApiResult<PlaybookModel> {
        let (playbook, kpis) =
            tokio::join!(backend.retention_playbook(domain), backend.kpis(domain));
        Ok(PlaybookModel::assemble(playbook?, &kpis?))
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.slot.begin_load()
    }

    pub fn finish_load(&mut self, token: RequestToken, result: ApiResult<PlaybookModel>) -> bool {
        self.slot.finish_load(token, result)
    }

    pub fn invalidate(&mut self) {
        self.slot.invalidate();
    }

    pub fn state(&self) -> &LoadState<PlaybookModel> {
        self.slot.state()
    }

    pub fn model(&self) -> Option<&PlaybookModel> {
        self.slot.ready()
    }

    pub fn model_mut(&mut self) -> Option<&mut PlaybookModel> {
        self.slot.ready_mut()
    }

    /// Starts an optimizer call. Rows stay visible while it is pending;
    /// returns None when there is no loaded playbook to optimize.
    pub fn begin_optimize(&mut self) -> Option<RequestToken> {
        if !self.slot.state().is_ready() {
            return None;
        }
        let token = self.slot.begin_request();
        if let Some(model) = self.slot.ready_mut() {
            model.optimizing = true;
        }
        Some(token)
    }

    /// Applies the optimizer outcome if the token is still current. An error
    /// is stored view-locally without disturbing the rows.
    pub fn finish_optimize(
        &mut self,
        token: RequestToken,
        result: ApiResult<OptimizeResponse>,
    ) -> bool {
        if !self.slot.accept(token) {
            return false;
        }
        let Some(model) = self.slot.ready_mut() else {
            return false;
        };
        model.optimizing = false;
        match result {
            Ok(resp) => model.apply_optimizer(resp),
            Err(err) => model.optimizer_error = Some(err),
        }
        true
    }
}

impl Default for PlaybookController {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::PriorityTier;

    fn strategy(priority: PriorityTier, action: &str) -> Strategy {
        Strategy {
            priority,
            condition: "condition".to_string(),
            action: action.to_string(),
            icon: None,
        }
    }

    fn kpis(total: u64) -> KpiSnapshot {
        KpiSnapshot {
            total_customers: total,
            churn_rate: 14.0,
            model_auc: 0.9,
            best_model: "XGBoost".to_string(),
            baseline_auc: None,
            dataset: None,
        }
    }

    fn five_strategy_model() -> PlaybookModel {
        PlaybookModel::assemble(
            RetentionPlaybook {
                strategies: vec![
                    strategy(PriorityTier::Critical, "Save desk"),
                    strategy(PriorityTier::High, "Roaming bundle"),
                    strategy(PriorityTier::High, "Service recovery call"),
                    strategy(PriorityTier::Medium, "Engagement nudge"),
                    strategy(PriorityTier::Medium, "Plan right-sizing"),
                ],
            },
            &kpis(3333),
        )
    }

    #[test]
    fn test_only_first_strategy_enabled_by_default() {
        let model = five_strategy_model();
        assert_eq!(model.enabled_indices(), vec![0]);
    }

    #[test]
    fn test_totals_cover_enabled_only() {
        let mut model = five_strategy_model();
        model.toggle(1);
        model.toggle(3);
        // enabled = {0, 1, 3}
        let mut expected = Projection::default();
        for i in [0usize, 1, 3] {
            expected.add(model.effective_projection(i).unwrap());
        }
        assert_eq!(model.totals(), expected);

        // sum(enabled) == sum(all) - sum(disabled)
        let mut all = Projection::default();
        let mut disabled = Projection::default();
        for i in 0..model.len() {
            let p = model.effective_projection(i).unwrap();
            all.add(p);
            if !model.is_enabled(i) {
                disabled.add(p);
            }
        }
        let totals = model.totals();
        assert!((totals.net_impact - (all.net_impact - disabled.net_impact)).abs() < 1e-9);
        assert!((totals.estimated_cost - (all.estimated_cost - disabled.estimated_cost)).abs() < 1e-9);
    }

    #[test]
    fn test_effective_projection_prefers_authoritative_fields() {
        let mut model = five_strategy_model();
        model.apply_optimizer(OptimizeResponse {
            selected_strategy_ids: vec![0],
            strategy_metrics: vec![StrategyMetrics {
                strategy_id: 0,
                targeted_customers: Some(42.0),
                prevented_churners: None,
                estimated_cost: None,
                estimated_net_impact: None,
            }],
        });
        let local = model.local_projection(0).unwrap();
        let effective = model.effective_projection(0).unwrap();
        assert_eq!(effective.targeted_customers, 42.0);
        assert_ne!(local.targeted_customers, 42.0, "local projection genuinely differs");
        assert_eq!(effective.prevented_churners, local.prevented_churners);
    }

    #[test]
    fn test_optimizer_replaces_enabled_set_and_overlay() {
        let mut model = five_strategy_model();
        model.toggle(4); // manual state that must be overwritten
        model.apply_optimizer(OptimizeResponse {
            selected_strategy_ids: vec![1, 2],
            strategy_metrics: vec![
                StrategyMetrics {
                    strategy_id: 1,
                    targeted_customers: Some(100.0),
                    prevented_churners: Some(12.0),
                    estimated_cost: Some(1500.0),
                    estimated_net_impact: Some(4500.0),
                },
                StrategyMetrics {
                    strategy_id: 2,
                    targeted_customers: Some(80.0),
                    prevented_churners: None,
                    estimated_cost: None,
                    estimated_net_impact: None,
                },
            ],
        });
        assert_eq!(model.enabled_indices(), vec![1, 2], "selection replaced, not merged");
        assert!(model.authoritative(0).is_none());
        assert_eq!(model.authoritative(1).unwrap().estimated_cost, Some(1500.0));

        // Re-applying a smaller result drops the previous overlay entirely.
        model.apply_optimizer(OptimizeResponse {
            selected_strategy_ids: vec![0],
            strategy_metrics: vec![],
        });
        assert_eq!(model.enabled_indices(), vec![0]);
        assert!(model.authoritative(1).is_none());
    }

    #[test]
    fn test_optimizer_ignores_out_of_range_ids() {
        let mut model = five_strategy_model();
        model.apply_optimizer(OptimizeResponse {
            selected_strategy_ids: vec![1, 17],
            strategy_metrics: vec![StrategyMetrics {
                strategy_id: 99,
                targeted_customers: Some(1.0),
                prevented_churners: None,
                estimated_cost: None,
                estimated_net_impact: None,
            }],
        });
        assert_eq!(model.enabled_indices(), vec![1]);
        assert!(model.authoritative(99).is_none());
    }

    #[test]
    fn test_optimize_error_keeps_rows_and_stores_error() {
        let mut ctl = PlaybookController::new();
        let token = ctl.begin_load();
        assert!(ctl.finish_load(token, Ok(five_strategy_model())));

        let opt = ctl.begin_optimize().unwrap();
        assert!(ctl.model().unwrap().optimizing, "rows stay visible while pending");
        assert_eq!(ctl.model().unwrap().len(), 5);

        let err = ApiError::Http { path: "/optimize-retention-portfolio".to_string(), status: 500 };
        assert!(ctl.finish_optimize(opt, Err(err)));
        let model = ctl.model().unwrap();
        assert!(!model.optimizing);
        assert!(model.optimizer_error.is_some());
        assert_eq!(model.enabled_indices(), vec![0], "rows undisturbed by the failure");
    }

    #[test]
    fn test_begin_optimize_requires_loaded_playbook() {
        let mut ctl = PlaybookController::new();
        assert!(ctl.begin_optimize().is_none());
    }

    #[test]
    fn test_stale_optimize_result_is_discarded() {
        let mut ctl = PlaybookController::new();
        let token = ctl.begin_load();
        assert!(ctl.finish_load(token, Ok(five_strategy_model())));

        let opt = ctl.begin_optimize().unwrap();
        // Domain switch invalidates the view before the optimizer resolves.
        ctl.invalidate();
        let resp = OptimizeResponse { selected_strategy_ids: vec![2], strategy_metrics: vec![] };
        assert!(!ctl.finish_optimize(opt, Ok(resp)));
        assert!(ctl.state().is_idle());
    }

    #[test]
    fn test_zero_segment_totals_are_zero() {
        let model = PlaybookModel::assemble(
            RetentionPlaybook { strategies: vec![strategy(PriorityTier::Critical, "x")] },
            &kpis(0),
        );
        assert_eq!(model.totals(), Projection::default());
    }
}
