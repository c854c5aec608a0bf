//! One-shot backend probe: hits every endpoint for every domain and prints
//! a status/latency report.
//!
//! Usage: cargo run --bin probe

use std::future::Future;
use std::time::Instant;

use anyhow::Result;

use churnboard::api::types::OptimizeRequest;
use churnboard::api::{ApiClient, ApiResult, Backend, HttpBackend};
use churnboard::view::simulate::{AbParams, RoiParams};
use churnboard::{Config, DomainId};

async fn timed<T>(name: &str, fut: impl Future<Output = ApiResult<T>>) -> bool {
    let started = Instant::now();
    let outcome = fut.await;
    let ms = started.elapsed().as_secs_f64() * 1000.0;
    match outcome {
        Ok(_) => {
            println!("  {:<36} ok        {:>8.1} ms", name, ms);
            true
        }
        Err(err) => {
            println!("  {:<36} {:<9} {:>8.1} ms  {}", name, err.kind(), ms, err);
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    println!(
        "Probing {} (timeout {} ms)",
        cfg.api_base, cfg.request_timeout_ms
    );

    let backend = HttpBackend::new(ApiClient::new(&cfg));
    let roi = RoiParams::default();
    let ab = AbParams::default();

    let mut passed = 0usize;
    let mut failed = 0usize;

    for domain in DomainId::ALL {
        println!();
        println!("=== {} ===", domain.label());

        let optimize = OptimizeRequest {
            budget: cfg.optimizer_budget,
            domain,
        };
        let checks = [
            timed("GET /kpis", backend.kpis(domain)).await,
            timed("GET /overview-analytics", backend.overview_analytics(domain)).await,
            timed("GET /model-performance", backend.model_performance(domain)).await,
            timed("GET /model-comparison", backend.model_comparison(domain)).await,
            timed("GET /feature-importance", backend.feature_importance(domain)).await,
            timed("GET /risk-ranking", backend.risk_ranking(domain)).await,
            timed("GET /retention-playbook", backend.retention_playbook(domain)).await,
            timed(
                "POST /optimize-retention-portfolio",
                backend.optimize_portfolio(&optimize),
            )
            .await,
            timed("POST /roi-simulation", backend.roi_simulation(&roi.to_request(domain))).await,
            timed("POST /ab-test", backend.ab_test(&ab.to_request(domain))).await,
        ];

        passed += checks.iter().filter(|ok| **ok).count();
        failed += checks.iter().filter(|ok| !**ok).count();
    }

    println!();
    println!("=== Summary ===");
    println!("{} passed, {} failed", passed, failed);

    if failed > 0 {
        anyhow::bail!("{} endpoint checks failed", failed);
    }
    Ok(())
}
