//! Endpoint seam between controllers and the HTTP client.
//!
//! Controllers depend on `&dyn Backend`, never on reqwest directly, so
//! orchestration logic is testable against scripted stand-ins.

use async_trait::async_trait;

use crate::domain::DomainId;

use super::types::{
    AbOutcome, AbRequest, FeatureImportance, KpiSnapshot, ModelComparison, ModelPerformance,
    OptimizeRequest, OptimizeResponse, OverviewAnalytics, RetentionPlaybook, RiskRanking,
    RoiOutcome, RoiRequest,
};
use super::{ApiClient, ApiResult};

#[async_trait]
pub trait Backend: Send + Sync {
    async fn kpis(&self, domain: DomainId) -> ApiResult<KpiSnapshot>;
    async fn overview_analytics(&self, domain: DomainId) -> ApiResult<OverviewAnalytics>;
    async fn model_performance(&self, domain: DomainId) -> ApiResult<ModelPerformance>;
    async fn model_comparison(&self, domain: DomainId) -> ApiResult<ModelComparison>;
    async fn feature_importance(&self, domain: DomainId) -> ApiResult<FeatureImportance>;
    async fn risk_ranking(&self, domain: DomainId) -> ApiResult<RiskRanking>;
    async fn retention_playbook(&self, domain: DomainId) -> ApiResult<RetentionPlaybook>;
    async fn optimize_portfolio(&self, req: &OptimizeRequest) -> ApiResult<OptimizeResponse>;
    async fn roi_simulation(&self, req: &RoiRequest) -> ApiResult<RoiOutcome>;
    async fn ab_test(&self, req: &AbRequest) -> ApiResult<AbOutcome>;
}

/// Production implementation over the REST backend.
pub struct HttpBackend {
    client: ApiClient,
}

impl HttpBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn kpis(&self, domain: DomainId) -> ApiResult<KpiSnapshot> {
        self.client.get_json("/kpis", Some(domain)).await
    }

    async fn overview_analytics(&self, domain: DomainId) -> ApiResult<OverviewAnalytics> {
        self.client.get_json("/overview-analytics", Some(domain)).await
    }

    async fn model_performance(&self, domain: DomainId) -> ApiResult<ModelPerformance> {
        self.client.get_json("/model-performance", Some(domain)).await
    }

    async fn model_comparison(&self, domain: DomainId) -> ApiResult<ModelComparison> {
        self.client.get_json("/model-comparison", Some(domain)).await
    }

    async fn feature_importance(&self, domain: DomainId) -> ApiResult<FeatureImportance> {
        self.client.get_json("/feature-importance", Some(domain)).await
    }

    async fn risk_ranking(&self, domain: DomainId) -> ApiResult<RiskRanking> {
        self.client.get_json("/risk-ranking", Some(domain)).await
    }

    async fn retention_playbook(&self, domain: DomainId) -> ApiResult<RetentionPlaybook> {
        self.client.get_json("/retention-playbook", Some(domain)).await
    }

    async fn optimize_portfolio(&self, req: &OptimizeRequest) -> ApiResult<OptimizeResponse> {
        self.client
            .post_json("/optimize-retention-portfolio", req.domain, req)
            .await
    }

    async fn roi_simulation(&self, req: &RoiRequest) -> ApiResult<RoiOutcome> {
        self.client.post_json("/roi-simulation", req.domain, req).await
    }

    async fn ab_test(&self, req: &AbRequest) -> ApiResult<AbOutcome> {
        self.client.post_json("/ab-test", req.domain, req).await
    }
}
