//! Overview page: headline KPIs joined with dataset analytics.

use crate::api::types::{KpiSnapshot, OverviewAnalytics};
use crate::api::{ApiResult, Backend};
use crate::domain::DomainId;

use super::{LoadState, RequestToken, ViewSlot};

#[derive(Debug)]
pub struct OverviewModel {
    pub kpis: KpiSnapshot,
    pub analytics: OverviewAnalytics,
}

impl OverviewModel {
    /// AUC improvement over the baseline model, when the backend reports one.
    pub fn auc_lift(&self) -> Option<f64> {
        self.kpis.baseline_auc.map(|baseline| self.kpis.model_auc - baseline)
    }

    /// Segment with the worst churn rate across all segmentations.
    pub fn riskiest_segment(&self) -> Option<(&str, f64)> {
        self.analytics
            .segmentations
            .iter()
            .flat_map(|s| s.rows.iter())
            .max_by(|a, b| a.churn_rate.total_cmp(&b.churn_rate))
            .map(|row| (row.segment.as_str(), row.churn_rate))
    }
}

#[derive(Debug)]
pub struct OverviewController {
    slot: ViewSlot<OverviewModel>,
}

impl OverviewController {
    pub fn new() -> Self {
        Self { slot: ViewSlot::new("overview") }
    }

    /// Both resources fetched concurrently; either failure fails the view.
    pub async fn fetch(backend: &dyn Backend, domain: DomainId) -> ApiResult<OverviewModel> {
        let (kpis, analytics) =
            tokio::join!(backend.kpis(domain), backend.overview_analytics(domain));
        Ok(OverviewModel { kpis: kpis?, analytics: analytics? })
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.slot.begin_load()
    }

    pub fn finish_load(&mut self, token: RequestToken, result: ApiResult<OverviewModel>) -> bool {
        self.slot.finish_load(token, result)
    }

    pub fn invalidate(&mut self) {
        self.slot.invalidate();
    }

    pub fn state(&self) -> &LoadState<OverviewModel> {
        self.slot.state()
    }

    pub fn model(&self) -> Option<&OverviewModel> {
        self.slot.ready()
    }

    pub fn superseded(&self) -> u64 {
        self.slot.superseded()
    }
}

impl Default for OverviewController {
    fn default() -> Self {
        Self::new()
    }
}
