//! Controller orchestration against a scripted backend: request
//! supersession across domain switches, joined fetches, simulator
//! lifecycle, and the optimizer overlay end to end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use churnboard::api::types::{
    AbOutcome, AbRequest, ClassCount, ClassImbalance, CustomerRisk, DataHealth, FeatureImportance,
    FeatureWeight, KpiSnapshot, ModelComparison, ModelComparisonEntry, ModelPerformance,
    OptimizeRequest, OptimizeResponse, OverviewAnalytics, PriorityTier, RetentionPlaybook,
    RiskRanking, RocCurve, RoiOutcome, RoiRequest, SegmentRow, Segmentation, Strategy,
    StrategyMetrics,
};
use churnboard::api::{ApiError, ApiResult, Backend};
use churnboard::view::risk::{GeoFilter, RevenueBucket};
use churnboard::view::simulate::RoiParams;
use churnboard::view::{
    AbSimulator, OverviewController, PlaybookController, RiskRankingController, RoiSimulator,
    SimPhase,
};
use churnboard::DomainId;

// =============================================================================
// Scripted backend
// =============================================================================

/// Deterministic per-domain payloads, a failure switch, and a call log for
/// asserting which endpoints a flow touched.
struct StubBackend {
    failing: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl StubBackend {
    fn new() -> Self {
        Self { failing: AtomicBool::new(false), calls: Mutex::new(Vec::new()) }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, endpoint: &str, domain: DomainId) -> ApiResult<()> {
        self.calls.lock().unwrap().push(format!("{}:{}", endpoint, domain.as_str()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Http { path: format!("/{}", endpoint), status: 500 });
        }
        Ok(())
    }

    fn customer_count(domain: DomainId) -> u64 {
        match domain {
            DomainId::Telecom => 3333,
            DomainId::Bank => 10_000,
            DomainId::Ecommerce => 5630,
        }
    }
}

fn stub_kpis(domain: DomainId) -> KpiSnapshot {
    KpiSnapshot {
        total_customers: StubBackend::customer_count(domain),
        churn_rate: match domain {
            DomainId::Telecom => 14.49,
            DomainId::Bank => 20.37,
            DomainId::Ecommerce => 16.84,
        },
        model_auc: 0.91,
        best_model: "XGBoost".to_string(),
        baseline_auc: Some(0.82),
        dataset: None,
    }
}

fn stub_analytics(domain: DomainId) -> OverviewAnalytics {
    let total = StubBackend::customer_count(domain);
    let churned = total / 5;
    OverviewAnalytics {
        data_health: DataHealth {
            missing_values_pct: 0.4,
            duplicate_records_pct: 0.0,
            rows: total,
            columns: 21,
        },
        class_imbalance: ClassImbalance {
            distribution: vec![
                ClassCount { name: "retained".to_string(), count: total - churned },
                ClassCount { name: "churned".to_string(), count: churned },
            ],
            ratio: 4.0,
        },
        segmentations: vec![Segmentation {
            title: "Churn by Contract".to_string(),
            rows: vec![
                SegmentRow { segment: "Month-to-month".to_string(), churn_rate: 42.7 },
                SegmentRow { segment: "Two year".to_string(), churn_rate: 2.8 },
            ],
        }],
    }
}

fn risk_row(id: &str, score: f64, revenue: f64, geography: &str) -> CustomerRisk {
    CustomerRisk {
        customer_id: id.to_string(),
        risk_score: score,
        churn_probability: score / 100.0,
        revenue_estimate: revenue,
        geography: geography.to_string(),
        plan_type: "Month-to-month".to_string(),
        suggested_action: "Save desk outreach".to_string(),
        balance: 0.0,
        risk_band: if score >= 70.0 { "High" } else { "Medium" }.to_string(),
    }
}

fn stub_strategies() -> Vec<Strategy> {
    vec![
        Strategy {
            priority: PriorityTier::Critical,
            condition: "risk_score >= 80".to_string(),
            action: "Save desk outreach".to_string(),
            icon: None,
        },
        Strategy {
            priority: PriorityTier::High,
            condition: "60 <= risk_score < 80".to_string(),
            action: "Service recovery call".to_string(),
            icon: None,
        },
        Strategy {
            priority: PriorityTier::Medium,
            condition: "40 <= risk_score < 60".to_string(),
            action: "Engagement nudge".to_string(),
            icon: None,
        },
    ]
}

#[async_trait]
impl Backend for StubBackend {
    async fn kpis(&self, domain: DomainId) -> ApiResult<KpiSnapshot> {
        self.record("kpis", domain)?;
        Ok(stub_kpis(domain))
    }

    async fn overview_analytics(&self, domain: DomainId) -> ApiResult<OverviewAnalytics> {
        self.record("overview-analytics", domain)?;
        Ok(stub_analytics(domain))
    }

    async fn model_performance(&self, domain: DomainId) -> ApiResult<ModelPerformance> {
        self.record("model-performance", domain)?;
        Ok(ModelPerformance {
            lr_roc: RocCurve { fpr: vec![0.0, 0.5, 1.0], tpr: vec![0.0, 0.7, 1.0] },
            xgb_roc: RocCurve { fpr: vec![0.0, 0.5, 1.0], tpr: vec![0.0, 0.85, 1.0] },
            rf_roc: RocCurve { fpr: vec![0.0, 0.5, 1.0], tpr: vec![0.0, 0.8, 1.0] },
            lr_auc: 0.84,
            xgb_auc: 0.91,
            rf_auc: 0.88,
            gain_population_pct: vec![10.0, 20.0, 50.0, 100.0],
            gain_capture_rate: vec![38.0, 58.0, 86.0, 100.0],
            capture_rate_top10: 38.0,
            best_model: "XGBoost".to_string(),
        })
    }

    async fn model_comparison(&self, domain: DomainId) -> ApiResult<ModelComparison> {
        self.record("model-comparison", domain)?;
        Ok(ModelComparison {
            models: vec![
                ModelComparisonEntry {
                    model: "XGBoost".to_string(),
                    roc_auc: 0.91,
                    top10_capture: 38.0,
                },
                ModelComparisonEntry {
                    model: "Logistic Regression".to_string(),
                    roc_auc: 0.84,
                    top10_capture: 31.0,
                },
            ],
        })
    }

    async fn feature_importance(&self, domain: DomainId) -> ApiResult<FeatureImportance> {
        self.record("feature-importance", domain)?;
        Ok(FeatureImportance {
            features: vec![
                FeatureWeight { feature: "contract_type".to_string(), importance: 0.31 },
                FeatureWeight { feature: "tenure_months".to_string(), importance: 0.24 },
            ],
            insight: "Contract type dominates churn risk".to_string(),
        })
    }

    async fn risk_ranking(&self, domain: DomainId) -> ApiResult<RiskRanking> {
        self.record("risk-ranking", domain)?;
        Ok(RiskRanking {
            customers: vec![
                risk_row("C-001", 93.5, 1240.0, "California"),
                risk_row("C-002", 88.1, 420.0, "Texas"),
                risk_row("C-003", 81.6, 980.0, "California"),
                risk_row("C-004", 74.0, 88.0, "New York"),
                risk_row("C-005", 66.3, 640.0, "California"),
                risk_row("C-006", 52.9, 310.0, "Texas"),
            ],
            total_in_segment: StubBackend::customer_count(domain),
        })
    }

    async fn retention_playbook(&self, domain: DomainId) -> ApiResult<RetentionPlaybook> {
        self.record("retention-playbook", domain)?;
        Ok(RetentionPlaybook { strategies: stub_strategies() })
    }

    async fn optimize_portfolio(&self, req: &OptimizeRequest) -> ApiResult<OptimizeResponse> {
        self.record("optimize-retention-portfolio", req.domain)?;
        Ok(OptimizeResponse {
            selected_strategy_ids: vec![1, 2],
            strategy_metrics: vec![StrategyMetrics {
                strategy_id: 1,
                targeted_customers: Some(210.0),
                prevented_churners: Some(29.0),
                estimated_cost: Some(6300.0),
                estimated_net_impact: Some(4200.0),
            }],
        })
    }

    async fn roi_simulation(&self, req: &RoiRequest) -> ApiResult<RoiOutcome> {
        self.record("roi-simulation", req.domain)?;
        let churners = 1450.0;
        let saved = churners * req.churn_reduction_pct / 100.0;
        let revenue_saved = saved * req.avg_revenue;
        let offer_cost = churners * req.offer_cost;
        Ok(RoiOutcome {
            revenue_saved,
            offer_cost,
            net_profit: revenue_saved - offer_cost,
            roi_percent: (revenue_saved - offer_cost) / offer_cost * 100.0,
            customers_targeted: 1450,
            churners_in_segment: 1450,
            churners_saved: saved,
        })
    }

    async fn ab_test(&self, req: &AbRequest) -> ApiResult<AbOutcome> {
        self.record("ab-test", req.domain)?;
        let control = 40.0;
        let treatment = control * (1.0 - req.churn_reduction_pct / 100.0);
        Ok(AbOutcome {
            control_churn_rate: control,
            treatment_churn_rate: treatment,
            control_group_size: 1000,
            treatment_group_size: 1000,
            absolute_reduction: control - treatment,
            relative_reduction: (control - treatment) / control * 100.0,
        })
    }
}

// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_overview_fetch_joins_kpis_and_analytics() {
    let stub = StubBackend::new();
    let mut ctl = OverviewController::new();

    let token = ctl.begin_load();
    let result = OverviewController::fetch(&stub, DomainId::Telecom).await;
    assert!(ctl.finish_load(token, result));

    let model = ctl.model().expect("overview ready after a successful load");
    assert_eq!(model.kpis.total_customers, 3333);
    assert_eq!(model.analytics.data_health.rows, 3333, "both halves describe the same dataset");

    let calls = stub.calls();
    assert!(calls.contains(&"kpis:telecom".to_string()));
    assert!(calls.contains(&"overview-analytics:telecom".to_string()));
    assert_eq!(calls.len(), 2, "one fetch touches exactly two endpoints");
}

// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_stale_domain_response_never_surfaces() {
    let stub = StubBackend::new();
    let mut ctl = OverviewController::new();

    // User selects telecom, then bank before telecom answers.
    let telecom_token = ctl.begin_load();
    let bank_token = ctl.begin_load();

    // Bank resolves first and is applied.
    let bank = OverviewController::fetch(&stub, DomainId::Bank).await;
    assert!(ctl.finish_load(bank_token, bank));

    // The telecom response lands afterwards and must be dropped on the floor.
    let telecom = OverviewController::fetch(&stub, DomainId::Telecom).await;
    assert!(!ctl.finish_load(telecom_token, telecom));

    let model = ctl.model().expect("bank data stays ready");
    assert_eq!(model.kpis.total_customers, 10_000, "displayed data belongs to the latest request");
    assert_eq!(ctl.superseded(), 1);
}

// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_failed_load_is_an_error_state_not_a_panic() {
    let stub = StubBackend::new();
    stub.set_failing(true);

    let mut ctl = OverviewController::new();
    let token = ctl.begin_load();
    let result = OverviewController::fetch(&stub, DomainId::Telecom).await;
    assert!(result.is_err());
    assert!(ctl.finish_load(token, result));

    assert!(ctl.model().is_none());
    assert_eq!(ctl.state().error().map(|e| e.kind()), Some("http"));

    // A later retry recovers without any reset ceremony.
    stub.set_failing(false);
    let retry = ctl.begin_load();
    let result = OverviewController::fetch(&stub, DomainId::Telecom).await;
    assert!(ctl.finish_load(retry, result));
    assert!(ctl.model().is_some(), "retry clears the error state");
}

// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_risk_funnel_applies_to_fetched_rows() {
    let stub = StubBackend::new();
    let mut ctl = RiskRankingController::new(50);

    let token = ctl.begin_load();
    let result = RiskRankingController::fetch(&stub, DomainId::Telecom).await;
    assert!(ctl.finish_load(token, result));

    // 6 rows at 50%: ceil(3) survive, ordered by risk descending.
    let ids: Vec<&str> = ctl.selection().iter().map(|c| c.customer_id.as_str()).collect();
    assert_eq!(ids, vec!["C-001", "C-002", "C-003"]);

    // Geography narrows before the percentile cut.
    ctl.set_geography(GeoFilter::Exact("California".to_string()));
    let ids: Vec<&str> = ctl.selection().iter().map(|c| c.customer_id.as_str()).collect();
    assert_eq!(ids, vec!["C-001", "C-003"], "3 Californians at 50% keep ceil(1.5) = 2");

    // Revenue bucket stacks on top of geography: C-003 and C-005 match, and
    // the 50% cut keeps the riskier of the two.
    ctl.set_bucket(Some(RevenueBucket::classify(980.0)));
    let ids: Vec<&str> = ctl.selection().iter().map(|c| c.customer_id.as_str()).collect();
    assert_eq!(ids, vec!["C-003"]);
}

// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_ab_simulator_stores_the_contract_outcome() {
    let stub = StubBackend::new();
    let mut sim = AbSimulator::ab();

    let (token, params) = sim.begin_run();
    assert!(sim.is_running());
    let result = stub.ab_test(&params.to_request(DomainId::Telecom)).await;
    assert!(sim.finish_run(token, params, result));

    let run = sim.last().expect("completed run stored");
    assert_eq!(run.outcome.control_churn_rate, 40.0);
    assert_eq!(run.outcome.treatment_churn_rate, 28.0);
    assert_eq!(run.outcome.absolute_reduction, 12.0);
    assert_eq!(run.outcome.relative_reduction, 30.0, "relative reduction equals the lift setting");
    assert!(!sim.is_stale(), "result matches the parameters on screen");
    assert!(matches!(sim.phase(), SimPhase::Idle));
}

// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_failed_rerun_keeps_previous_result_visible() {
    let stub = StubBackend::new();
    let mut sim = RoiSimulator::roi();

    let (token, params) = sim.begin_run();
    let result = stub.roi_simulation(&params.to_request(DomainId::Telecom)).await;
    assert!(sim.finish_run(token, params, result));
    assert_eq!(sim.last().unwrap().outcome.net_profit, 145_000.0);

    // User tweaks the lift; the old result is now answering stale inputs.
    sim.set_params(RoiParams { churn_reduction_pct: 45.0, ..RoiParams::default() });
    assert!(sim.is_stale());

    // The rerun fails. The previous result must survive next to the error.
    stub.set_failing(true);
    let (token, params) = sim.begin_run();
    let result = stub.roi_simulation(&params.to_request(DomainId::Telecom)).await;
    assert!(sim.finish_run(token, params, result));

    assert!(sim.error().is_some());
    let run = sim.last().expect("failed rerun keeps the last completed result");
    assert_eq!(run.params.churn_reduction_pct, 30.0, "kept result still answers the old inputs");
    assert!(sim.is_stale(), "and is still flagged stale against the new inputs");
}

// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_superseded_simulation_run_is_dropped() {
    let stub = StubBackend::new();
    let mut sim = RoiSimulator::roi();

    let (first, first_params) = sim.begin_run();
    sim.set_params(RoiParams { offer_cost: 100.0, ..RoiParams::default() });
    let (second, second_params) = sim.begin_run();

    let second_result = stub.roi_simulation(&second_params.to_request(DomainId::Bank)).await;
    assert!(sim.finish_run(second, second_params, second_result));

    let first_result = stub.roi_simulation(&first_params.to_request(DomainId::Bank)).await;
    assert!(!sim.finish_run(first, first_params, first_result), "older run is rejected");

    assert_eq!(sim.superseded(), 1);
    assert_eq!(
        sim.last().unwrap().params.offer_cost,
        100.0,
        "stored result belongs to the newer run"
    );
}

// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_invalidate_discards_results_and_pending_runs() {
    let stub = StubBackend::new();
    let mut sim = AbSimulator::ab();

    let (token, params) = sim.begin_run();
    let result = stub.ab_test(&params.to_request(DomainId::Telecom)).await;
    assert!(sim.finish_run(token, params, result));
    assert!(sim.last().is_some());

    // A run is in flight when the domain switches.
    let (pending, pending_params) = sim.begin_run();
    sim.invalidate();

    assert!(sim.last().is_none(), "results from another dataset are dropped");
    assert!(matches!(sim.phase(), SimPhase::Idle));

    let late = stub.ab_test(&pending_params.to_request(DomainId::Telecom)).await;
    assert!(!sim.finish_run(pending, pending_params, late), "in-flight run cannot resurface");
    assert!(sim.last().is_none());
}

// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_optimizer_selection_applies_end_to_end() {
    let stub = StubBackend::new();
    let mut ctl = PlaybookController::new();

    let token = ctl.begin_load();
    let result = PlaybookController::fetch(&stub, DomainId::Telecom).await;
    assert!(ctl.finish_load(token, result));
    assert_eq!(ctl.model().unwrap().enabled_indices(), vec![0]);

    let opt = ctl.begin_optimize().expect("loaded playbook accepts an optimize call");
    assert!(ctl.model().unwrap().optimizing);
    assert_eq!(ctl.model().unwrap().len(), 3, "rows stay visible while the optimizer runs");

    let req = OptimizeRequest { budget: 10_000.0, domain: DomainId::Telecom };
    let resp = stub.optimize_portfolio(&req).await;
    assert!(ctl.finish_optimize(opt, resp));

    let model = ctl.model().unwrap();
    assert!(!model.optimizing);
    assert_eq!(model.enabled_indices(), vec![1, 2], "enabled set becomes the backend selection");

    // Strategy 1 carries authoritative metrics; strategy 2 falls back to the
    // local projection.
    let effective = model.effective_projection(1).unwrap();
    assert_eq!(effective.net_impact, 4200.0);
    assert_eq!(effective.targeted_customers, 210.0);
    let local = model.local_projection(2).unwrap();
    assert_eq!(model.effective_projection(2).unwrap(), local);
}
