use anyhow::Result;
use tokio::time::{sleep, Duration};

use churnboard::api::{ApiClient, HttpBackend};
use churnboard::app::{AppEvent, Page};
use churnboard::logging::{self, obj, v_num, v_str, Domain, Level};
use churnboard::{Config, DashboardSession, DomainId};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    logging::log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("msg", v_str("churnboard session starting")),
            ("api_base", v_str(&cfg.api_base)),
            ("default_domain", v_str(cfg.default_domain.as_str())),
            ("config_fingerprint", v_str(&cfg.fingerprint())),
        ]),
    );

    let client = ApiClient::new(&cfg);
    let mut session = DashboardSession::new(Box::new(HttpBackend::new(client)), &cfg);
    let refresh = Duration::from_secs(cfg.refresh_secs.max(1));

    loop {
        for domain in DomainId::ALL {
            // Selecting the already-active domain emits nothing, so the
            // refresh that follows covers the first sweep too.
            session.handle(AppEvent::DomainSelected(domain)).await;
            session.handle(AppEvent::RefreshRequested).await;
            for page in Page::ALL {
                session.handle(AppEvent::PageSelected(page)).await;
            }

            session.run_roi().await;
            session.run_ab().await;
            session.optimize().await;

            log_domain_digest(&session);
        }

        session.log_summary();
        logging::tick_aggregator();
        logging::flush_sinks();
        sleep(refresh).await;
    }
}

/// One compact record per domain sweep so a run can be skimmed without
/// replaying the event log.
fn log_domain_digest(session: &DashboardSession) {
    let domain = session.app().domain;

    let churn_rate = session
        .overview()
        .model()
        .map(|m| m.kpis.churn_rate)
        .unwrap_or(f64::NAN);
    let best_model = session
        .performance()
        .model()
        .and_then(|m| m.best_entry())
        .map(|e| e.model.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let shown = session.risk().selection().len();
    let totals = session.playbook().model().map(|m| m.totals());
    let roi_net = session
        .roi()
        .last()
        .map(|run| run.outcome.net_profit)
        .unwrap_or(f64::NAN);

    logging::log(
        Level::Info,
        Domain::Metrics,
        "domain_digest",
        obj(&[
            ("domain", v_str(domain.as_str())),
            ("churn_rate", v_num(churn_rate)),
            ("best_model", v_str(&best_model)),
            ("risk_rows_shown", v_num(shown as f64)),
            (
                "playbook_net_impact",
                v_num(totals.map(|t| t.net_impact).unwrap_or(f64::NAN)),
            ),
            ("roi_net_profit", v_num(roi_net)),
        ]),
    );
}
