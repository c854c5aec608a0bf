//! Wire payloads for the backend's REST endpoints.
//!
//! Shapes mirror what the backend actually sends; extra fields are ignored
//! by serde, and fields the backend may omit are `Option` so absence never
//! fails a decode.

use serde::{Deserialize, Serialize};

use crate::domain::DomainId;

// =============================================================================
// GET /kpis
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KpiSnapshot {
    pub total_customers: u64,
    /// Percent, already scaled (e.g. 14.49).
    pub churn_rate: f64,
    pub model_auc: f64,
    pub best_model: String,
    #[serde(default)]
    pub baseline_auc: Option<f64>,
    #[serde(default)]
    pub dataset: Option<String>,
}

// =============================================================================
// GET /overview-analytics
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataHealth {
    pub missing_values_pct: f64,
    pub duplicate_records_pct: f64,
    pub rows: u64,
    pub columns: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassImbalance {
    pub distribution: Vec<ClassCount>,
    /// Majority:minority ratio.
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SegmentRow {
    pub segment: String,
    pub churn_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Segmentation {
    pub title: String,
    pub rows: Vec<SegmentRow>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverviewAnalytics {
    pub data_health: DataHealth,
    pub class_imbalance: ClassImbalance,
    pub segmentations: Vec<Segmentation>,
}

// =============================================================================
// GET /model-performance, /model-comparison
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelPerformance {
    pub lr_roc: RocCurve,
    pub xgb_roc: RocCurve,
    pub rf_roc: RocCurve,
    pub lr_auc: f64,
    pub xgb_auc: f64,
    pub rf_auc: f64,
    pub gain_population_pct: Vec<f64>,
    pub gain_capture_rate: Vec<f64>,
    /// Capture rate within the top decile, percent.
    pub capture_rate_top10: f64,
    pub best_model: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelComparisonEntry {
    pub model: String,
    pub roc_auc: f64,
    pub top10_capture: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelComparison {
    pub models: Vec<ModelComparisonEntry>,
}

// =============================================================================
// GET /feature-importance
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureImportance {
    pub features: Vec<FeatureWeight>,
    pub insight: String,
}

// =============================================================================
// GET /risk-ranking
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRisk {
    pub customer_id: String,
    /// 0–100, one decimal.
    pub risk_score: f64,
    /// 0–1.
    pub churn_probability: f64,
    pub revenue_estimate: f64,
    pub geography: String,
    pub plan_type: String,
    pub suggested_action: String,
    pub balance: f64,
    pub risk_band: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RiskRanking {
    pub customers: Vec<CustomerRisk>,
    pub total_in_segment: u64,
}

// =============================================================================
// GET /retention-playbook
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    Critical,
    High,
    Medium,
}

impl PriorityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityTier::Critical => "Critical",
            PriorityTier::High => "High",
            PriorityTier::Medium => "Medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Strategy {
    pub priority: PriorityTier,
    pub condition: String,
    pub action: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetentionPlaybook {
    pub strategies: Vec<Strategy>,
}

// =============================================================================
// POST /optimize-retention-portfolio
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeRequest {
    pub budget: f64,
    pub domain: DomainId,
}

/// Authoritative per-strategy metrics. Every value is individually optional
/// so precedence over local projections stays field-by-field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrategyMetrics {
    /// Zero-based index into the playbook's received ordering.
    pub strategy_id: usize,
    #[serde(default)]
    pub targeted_customers: Option<f64>,
    #[serde(default)]
    pub prevented_churners: Option<f64>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub estimated_net_impact: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptimizeResponse {
    pub selected_strategy_ids: Vec<usize>,
    pub strategy_metrics: Vec<StrategyMetrics>,
}

// =============================================================================
// POST /roi-simulation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiRequest {
    pub avg_revenue: f64,
    pub offer_cost: f64,
    pub churn_reduction_pct: f64,
    pub domain: DomainId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoiOutcome {
    pub revenue_saved: f64,
    pub offer_cost: f64,
    pub net_profit: f64,
    pub roi_percent: f64,
    pub customers_targeted: u64,
    pub churners_in_segment: u64,
    pub churners_saved: f64,
}

// =============================================================================
// POST /ab-test
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbRequest {
    pub churn_reduction_pct: f64,
    pub domain: DomainId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AbOutcome {
    /// Percent.
    pub control_churn_rate: f64,
    /// Percent.
    pub treatment_churn_rate: f64,
    pub control_group_size: u64,
    pub treatment_group_size: u64,
    /// Percentage points: control minus treatment.
    pub absolute_reduction: f64,
    /// Percent of the control rate.
    pub relative_reduction: f64,
}

// =============================================================================
// Tests
// =============================================================================
