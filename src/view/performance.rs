//! Model Performance page: ROC/gain curves joined with the comparison table.

use crate::api::types::{ModelComparison, ModelComparisonEntry, ModelPerformance};
use crate::api::{ApiResult, Backend};
use crate::domain::DomainId;

use super::{LoadState, RequestToken, ViewSlot};

#[derive(Debug)]
pub struct PerformanceModel {
    pub performance: ModelPerformance,
    pub comparison: Vec<ModelComparisonEntry>,
    best_index: Option<usize>,
}

impl PerformanceModel {
    pub fn assemble(performance: ModelPerformance, comparison: ModelComparison) -> Self {
        let best_index = best_capture_index(&comparison.models);
        Self { performance, comparison: comparison.models, best_index }
    }

    /// Comparison entry with the highest top-decile capture; ties go to the
    /// earlier entry in the received ordering.
    pub fn best_entry(&self) -> Option<&ModelComparisonEntry> {
        self.best_index.map(|i| &self.comparison[i])
    }
}

fn best_capture_index(models: &[ModelComparisonEntry]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, entry) in models.iter().enumerate() {
        match best {
            None => best = Some(i),
            Some(j) if entry.top10_capture > models[j].top10_capture => best = Some(i),
            _ => {}
        }
    }
    best
}

#[derive(Debug)]
pub struct ModelPerformanceController {
    slot: ViewSlot<PerformanceModel>,
}

impl ModelPerformanceController {
    pub fn new() -> Self {
        Self { slot: ViewSlot::new("model_performance") }
    }

    pub async fn fetch(backend: &dyn Backend, domain: DomainId) -> ApiResult<PerformanceModel> {
        let (performance, comparison) = tokio::join!(
            backend.model_performance(domain),
            backend.model_comparison(domain)
        );
        Ok(PerformanceModel::assemble(performance?, comparison?))
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.slot.begin_load()
    }

    pub fn finish_load(&mut self, token: RequestToken, result: ApiResult<PerformanceModel>) -> bool {
        self.slot.finish_load(token, result)
    }

    pub fn invalidate(&mut self) {
        self.slot.invalidate();
    }

    pub fn state(&self) -> &LoadState<PerformanceModel> {
        self.slot.state()
    }

    pub fn model(&self) -> Option<&PerformanceModel> {
        self.slot.ready()
    }
}

impl Default for ModelPerformanceController {
    fn default() -> Self {
        Self::new()
    }
}
