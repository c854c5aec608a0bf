//! Feature Importance page.

use crate::api::types::{FeatureImportance, FeatureWeight};
use crate::api::{ApiResult, Backend};
use crate::domain::DomainId;

use super::{LoadState, RequestToken, ViewSlot};

#[derive(Debug)]
pub struct FeatureImportanceController {
    slot: ViewSlot<FeatureImportance>,
}

impl FeatureImportanceController {
    pub fn new() -> Self {
        Self { slot: ViewSlot::new("feature_importance") }
    }

    pub async fn fetch(backend: &dyn Backend, domain: DomainId) -> ApiResult<FeatureImportance> {
        backend.feature_importance(domain).await
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.slot.begin_load()
    }

    pub fn finish_load(&mut self, token: RequestToken, result: ApiResult<FeatureImportance>) -> bool {
        self.slot.finish_load(token, result)
    }

    pub fn invalidate(&mut self) {
        self.slot.invalidate();
    }

    pub fn state(&self) -> &LoadState<FeatureImportance> {
        self.slot.state()
    }

    pub fn model(&self) -> Option<&FeatureImportance> {
        self.slot.ready()
    }

    /// Features ordered by importance descending. The received collection is
    /// never reordered; this derives a fresh view each call.
    pub fn ranked(&self) -> Vec<&FeatureWeight> {
        let mut refs: Vec<&FeatureWeight> = self
            .slot
            .ready()
            .map(|model| model.features.iter().collect())
            .unwrap_or_default();
        refs.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        refs
    }

    /// Largest importance, used to scale bars relative to the leader.
    pub fn max_importance(&self) -> f64 {
        self.ranked().first().map(|f| f.importance).unwrap_or(0.0)
    }
}

impl Default for FeatureImportanceController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(feature: &str, importance: f64) -> FeatureWeight {
        FeatureWeight { feature: feature.to_string(), importance }
    }

    fn loaded_controller() -> FeatureImportanceController {
        let mut ctl = FeatureImportanceController::new();
        let token = ctl.begin_load();
        ctl.finish_load(
            token,
            Ok(FeatureImportance {
                features: vec![
                    weight("account_length", 0.04),
                    weight("intl_plan", 0.31),
                    weight("day_minutes", 0.22),
                ],
                insight: "International plan drives churn".to_string(),
            }),
        );
        ctl
    }

    #[test]
    fn test_ranked_is_descending_and_source_untouched() {
        let ctl = loaded_controller();
        let ranked: Vec<&str> = ctl.ranked().iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(ranked, vec!["intl_plan", "day_minutes", "account_length"]);
        // Received order preserved in the model itself.
        let source: Vec<&str> =
            ctl.model().unwrap().features.iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(source, vec!["account_length", "intl_plan", "day_minutes"]);
    }

    #[test]
    fn test_max_importance_scales_to_leader() {
        let ctl = loaded_controller();
        assert_eq!(ctl.max_importance(), 0.31);
    }

    #[test]
    fn test_empty_model_yields_zero_scale() {
        let ctl = FeatureImportanceController::new();
        assert!(ctl.ranked().is_empty());
        assert_eq!(ctl.max_importance(), 0.0);
    }
}
