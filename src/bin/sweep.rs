//! Retention-offer scenario sweep: runs named ROI simulations against the
//! backend and ranks them by projected net profit.
//!
//! Usage: cargo run --bin sweep -- [domain]

use std::time::Instant;

use anyhow::Result;

use churnboard::api::types::RoiOutcome;
use churnboard::api::{ApiClient, Backend, HttpBackend};
use churnboard::view::simulate::RoiParams;
use churnboard::{Config, DomainId};

/// Offer scenario under test.
#[derive(Debug, Clone)]
struct Scenario {
    name: &'static str,
    avg_revenue: f64,
    offer_cost: f64,
    churn_reduction_pct: f64,
}

impl Scenario {
    fn baseline() -> Self {
        Self {
            name: "baseline",
            avg_revenue: 500.0,
            offer_cost: 50.0,
            churn_reduction_pct: 30.0,
        }
    }

    fn variants() -> Vec<Self> {
        vec![
            Self::baseline(),
            // === OFFER COST ===
            Self { name: "cost_token", offer_cost: 10.0, ..Self::baseline() },
            Self { name: "cost_light", offer_cost: 25.0, ..Self::baseline() },
            Self { name: "cost_rich", offer_cost: 100.0, ..Self::baseline() },
            Self { name: "cost_premium", offer_cost: 200.0, ..Self::baseline() },
            // === OFFER EFFECTIVENESS ===
            Self { name: "lift_weak", churn_reduction_pct: 10.0, ..Self::baseline() },
            Self { name: "lift_modest", churn_reduction_pct: 20.0, ..Self::baseline() },
            Self { name: "lift_strong", churn_reduction_pct: 45.0, ..Self::baseline() },
            Self { name: "lift_max", churn_reduction_pct: 60.0, ..Self::baseline() },
            // === REVENUE SEGMENTS ===
            Self { name: "seg_budget", avg_revenue: 120.0, ..Self::baseline() },
            Self { name: "seg_mid", avg_revenue: 400.0, ..Self::baseline() },
            Self { name: "seg_premium", avg_revenue: 900.0, ..Self::baseline() },
            Self { name: "seg_enterprise", avg_revenue: 2500.0, ..Self::baseline() },
            // === COMBINED PLAYS ===
            // Cheap nudge at scale: low cost, low lift
            Self {
                name: "combo_nudge",
                avg_revenue: 300.0,
                offer_cost: 10.0,
                churn_reduction_pct: 12.0,
            },
            // Concierge save desk: expensive, aimed at premium accounts
            Self {
                name: "combo_concierge",
                avg_revenue: 1200.0,
                offer_cost: 180.0,
                churn_reduction_pct: 50.0,
            },
            // Discount-heavy winback on mid-value accounts
            Self {
                name: "combo_winback",
                avg_revenue: 450.0,
                offer_cost: 120.0,
                churn_reduction_pct: 40.0,
            },
        ]
    }

    fn params(&self) -> RoiParams {
        RoiParams {
            avg_revenue: self.avg_revenue,
            offer_cost: self.offer_cost,
            churn_reduction_pct: self.churn_reduction_pct,
        }
    }
}

#[derive(Debug)]
struct TrialResult {
    scenario: String,
    outcome: Option<RoiOutcome>,
    error: Option<String>,
    runtime_ms: u64,
}

impl TrialResult {
    fn net_profit(&self) -> f64 {
        self.outcome.as_ref().map(|o| o.net_profit).unwrap_or(f64::NEG_INFINITY)
    }
}

async fn run_scenario(backend: &dyn Backend, domain: DomainId, scenario: &Scenario) -> TrialResult {
    let started = Instant::now();
    let result = backend.roi_simulation(&scenario.params().to_request(domain)).await;
    let runtime_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(outcome) => TrialResult {
            scenario: scenario.name.to_string(),
            outcome: Some(outcome),
            error: None,
            runtime_ms,
        },
        Err(err) => TrialResult {
            scenario: scenario.name.to_string(),
            outcome: None,
            error: Some(err.to_string()),
            runtime_ms,
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let domain = std::env::args()
        .nth(1)
        .and_then(|v| DomainId::parse(&v))
        .unwrap_or(cfg.default_domain);

    println!("Sweeping {} against {}", domain.label(), cfg.api_base);

    let backend = HttpBackend::new(ApiClient::new(&cfg));
    let scenarios = Scenario::variants();
    println!("Running {} scenarios...", scenarios.len());
    println!();

    let mut results: Vec<TrialResult> = Vec::with_capacity(scenarios.len());
    for scenario in &scenarios {
        results.push(run_scenario(&backend, domain, scenario).await);
    }

    results.sort_by(|a, b| b.net_profit().total_cmp(&a.net_profit()));

    println!(
        "{:<18} {:>12} {:>12} {:>12} {:>8} {:>10} {:>6}",
        "Scenario", "Saved", "Cost", "Net", "ROI%", "Targeted", "ms"
    );
    println!("{}", "-".repeat(84));
    for r in &results {
        match (&r.outcome, &r.error) {
            (Some(o), _) => println!(
                "{:<18} {:>12.0} {:>12.0} {:>12.0} {:>8.1} {:>10} {:>6}",
                r.scenario,
                o.revenue_saved,
                o.offer_cost,
                o.net_profit,
                o.roi_percent,
                o.customers_targeted,
                r.runtime_ms
            ),
            (None, Some(err)) => {
                println!("{:<18} failed: {}", r.scenario, err)
            }
            (None, None) => {}
        }
    }

    let completed: Vec<&TrialResult> = results.iter().filter(|r| r.outcome.is_some()).collect();
    if completed.is_empty() {
        anyhow::bail!("no scenario completed");
    }

    println!();
    println!("Best:  {} (net {:.0})", completed[0].scenario, completed[0].net_profit());
    let worst = completed.last().unwrap();
    println!("Worst: {} (net {:.0})", worst.scenario, worst.net_profit());

    println!();
    println!("=== Analysis by Category ===");

    let find = |name: &str| completed.iter().find(|r| r.scenario == name);

    if let (Some(base), Some(token), Some(premium)) =
        (find("baseline"), find("cost_token"), find("cost_premium"))
    {
        println!("\nOFFER COST DRAG:");
        println!("  Token offer:   net {:>12.0}", token.net_profit());
        println!("  Baseline:      net {:>12.0}", base.net_profit());
        println!("  Premium offer: net {:>12.0}", premium.net_profit());
        println!(
            "  Cost swing:    {:.0} across a {:.0}x cost range",
            token.net_profit() - premium.net_profit(),
            200.0 / 10.0
        );
    }

    let lifts: Vec<&&TrialResult> = completed
        .iter()
        .filter(|r| r.scenario.starts_with("lift_"))
        .collect();
    if !lifts.is_empty() {
        println!("\nEFFECTIVENESS SENSITIVITY:");
        for r in lifts {
            let o = r.outcome.as_ref().unwrap();
            println!(
                "  {:<14} net={:>12.0}  saved={:>12.0}  roi={:>7.1}%",
                r.scenario, o.net_profit, o.revenue_saved, o.roi_percent
            );
        }
    }

    let segments: Vec<&&TrialResult> = completed
        .iter()
        .filter(|r| r.scenario.starts_with("seg_"))
        .collect();
    if !segments.is_empty() {
        println!("\nREVENUE SEGMENTS:");
        for r in segments {
            let o = r.outcome.as_ref().unwrap();
            println!(
                "  {:<14} net={:>12.0}  targeted={:>8}  saved_churners={:>8.1}",
                r.scenario, o.net_profit, o.customers_targeted, o.churners_saved
            );
        }
    }

    let failures = results.len() - completed.len();
    if failures > 0 {
        println!();
        println!("{} scenario(s) failed", failures);
    }

    Ok(())
}
