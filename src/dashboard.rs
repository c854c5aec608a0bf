//! The dashboard session: one app state, seven views, one backend.
//!
//! `handle` is the single entry point for user events. It runs the reducer,
//! writes the audit record, then interprets the emitted commands in order.
//! Fetches are awaited here, outside any controller borrow, so a controller
//! only ever sees `begin_load` and `finish_load` edges.

use std::time::Instant;

use crate::api::types::OptimizeRequest;
use crate::api::Backend;
use crate::app::{reduce, AppEvent, AppState, Command, Page};
use crate::config::Config;
use crate::logging::{self, obj, v_str, ProfileScope};
use crate::view::{
    AbSimulator, FeatureImportanceController, ModelPerformanceController, OverviewController,
    PlaybookController, RiskRankingController, RoiSimulator,
};

pub struct DashboardSession {
    backend: Box<dyn Backend>,
    app: AppState,
    started: Instant,
    optimizer_budget: f64,
    overview: OverviewController,
    performance: ModelPerformanceController,
    features: FeatureImportanceController,
    risk: RiskRankingController,
    playbook: PlaybookController,
    roi: RoiSimulator,
    ab: AbSimulator,
}

impl DashboardSession {
    pub fn new(backend: Box<dyn Backend>, cfg: &Config) -> Self {
        Self {
            backend,
            app: AppState::new(cfg.default_domain, cfg.theme),
            started: Instant::now(),
            optimizer_budget: cfg.optimizer_budget,
            overview: OverviewController::new(),
            performance: ModelPerformanceController::new(),
            features: FeatureImportanceController::new(),
            risk: RiskRankingController::new(cfg.top_n_percent),
            playbook: PlaybookController::new(),
            roi: RoiSimulator::roi(),
            ab: AbSimulator::ab(),
        }
    }

    /// Applies one event and interprets every command it produced.
    pub async fn handle(&mut self, event: AppEvent) {
        let prior_domain = self.app.domain;
        let out = reduce(&mut self.app, event);
        logging::log_audit(event.name(), out.state_hash, self.app.seq);

        if let AppEvent::DomainSelected(_) = event {
            if self.app.domain != prior_domain {
                logging::log_domain_switch(prior_domain.as_str(), self.app.domain.as_str());
            }
        }

        for command in out.commands {
            match command {
                Command::LoadView(page) => self.load_page(page).await,
                Command::InvalidateViews => self.invalidate_all(),
                Command::ApplyTheme(theme) => {
                    logging::log(
                        logging::Level::Debug,
                        logging::Domain::App,
                        "theme_applied",
                        obj(&[("msg", v_str(theme.as_str()))]),
                    );
                }
                Command::Log { level, msg } => {
                    logging::log(
                        level,
                        logging::Domain::App,
                        "app",
                        obj(&[("msg", v_str(&msg))]),
                    );
                }
            }
        }
    }

    /// Fetches the data backing one page. Simulator pages hold no server
    /// snapshot; their fetches happen only on explicit runs.
    async fn load_page(&mut self, page: Page) {
        let domain = self.app.domain;
        let _scope =
            ProfileScope::with_context("view", "page_load", &[("page", v_str(page.as_str()))]);
        match page {
            Page::Overview => {
                let token = self.overview.begin_load();
                let result = OverviewController::fetch(self.backend.as_ref(), domain).await;
                self.overview.finish_load(token, result);
            }
            Page::ModelPerformance => {
                let token = self.performance.begin_load();
                let result = ModelPerformanceController::fetch(self.backend.as_ref(), domain).await;
                self.performance.finish_load(token, result);
            }
            Page::FeatureImportance => {
                let token = self.features.begin_load();
                let result = FeatureImportanceController::fetch(self.backend.as_ref(), domain).await;
                self.features.finish_load(token, result);
            }
            Page::RiskRanking => {
                let token = self.risk.begin_load();
                let result = self.backend.risk_ranking(domain).await;
                self.risk.finish_load(token, result);
            }
            Page::RetentionPlaybook => {
                let token = self.playbook.begin_load();
                let result = PlaybookController::fetch(self.backend.as_ref(), domain).await;
                self.playbook.finish_load(token, result);
            }
            Page::RoiSimulator | Page::AbTesting => {}
        }
    }

    /// Drops every snapshot, parameter edits included on the simulators'
    /// result side, and poisons all in-flight tokens.
    fn invalidate_all(&mut self) {
        self.overview.invalidate();
        self.performance.invalidate();
        self.features.invalidate();
        self.risk.invalidate();
        self.playbook.invalidate();
        self.roi.invalidate();
        self.ab.invalidate();
    }

    /// Runs the ROI simulation with the current parameters against the
    /// current domain.
    pub async fn run_roi(&mut self) {
        let domain = self.app.domain;
        let (token, params) = self.roi.begin_run();
        let hash = logging::params_hash(&params.params_key(domain));
        logging::log_simulation("roi", &hash, domain.as_str(), "submitted");
        logging::agg_increment("simulation");

        let result = self.backend.roi_simulation(&params.to_request(domain)).await;
        let outcome = if result.is_ok() { "completed" } else { "failed" };
        let applied = self.roi.finish_run(token, params, result);
        logging::log_simulation(
            "roi",
            &hash,
            domain.as_str(),
            if applied { outcome } else { "superseded" },
        );
    }

    /// Runs the A/B test projection with the current parameters.
    pub async fn run_ab(&mut self) {
        let domain = self.app.domain;
        let (token, params) = self.ab.begin_run();
        let hash = logging::params_hash(&params.params_key(domain));
        logging::log_simulation("ab_test", &hash, domain.as_str(), "submitted");
        logging::agg_increment("simulation");

        let result = self.backend.ab_test(&params.to_request(domain)).await;
        let outcome = if result.is_ok() { "completed" } else { "failed" };
        let applied = self.ab.finish_run(token, params, result);
        logging::log_simulation(
            "ab_test",
            &hash,
            domain.as_str(),
            if applied { outcome } else { "superseded" },
        );
    }

    /// Submits the loaded playbook for portfolio optimization. No-op when
    /// the playbook view has nothing to optimize.
    pub async fn optimize(&mut self) {
        let domain = self.app.domain;
        let Some(token) = self.playbook.begin_optimize() else {
            return;
        };
        let req = OptimizeRequest {
            budget: self.optimizer_budget,
            domain,
        };
        let result = self.backend.optimize_portfolio(&req).await;
        self.playbook.finish_optimize(token, result);
    }

    /// Emits the rolled-up session counters. The driver calls this once per
    /// refresh cycle and on shutdown paths.
    pub fn log_summary(&self) {
        logging::log_session_summary(self.started.elapsed().as_secs(), logging::agg_totals());
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn app(&self) -> &AppState {
        &self.app
    }

    pub fn overview(&self) -> &OverviewController {
        &self.overview
    }

    pub fn performance(&self) -> &ModelPerformanceController {
        &self.performance
    }

    pub fn features(&self) -> &FeatureImportanceController {
        &self.features
    }

    pub fn risk(&self) -> &RiskRankingController {
        &self.risk
    }

    pub fn risk_mut(&mut self) -> &mut RiskRankingController {
        &mut self.risk
    }

    pub fn playbook(&self) -> &PlaybookController {
        &self.playbook
    }

    pub fn playbook_mut(&mut self) -> &mut PlaybookController {
        &mut self.playbook
    }

    pub fn roi(&self) -> &RoiSimulator {
        &self.roi
    }

    pub fn roi_mut(&mut self) -> &mut RoiSimulator {
        &mut self.roi
    }

    pub fn ab(&self) -> &AbSimulator {
        &self.ab
    }

    pub fn ab_mut(&mut self) -> &mut AbSimulator {
        &mut self.ab
    }
}
