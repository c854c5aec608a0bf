//! Risk Ranking page: geography/revenue filters, a top-N sensitivity
//! control, and an independent display sort.
//!
//! Selection pipeline, in order: filter → rank by risk score descending →
//! take ceil(N% × filtered) rows (at least one if any matched) → display
//! sort. The display sort reorders the selected slice only; it can never
//! change which rows were selected.

use crate::api::types::{CustomerRisk, RiskRanking};
use crate::api::{ApiResult, Backend};
use crate::domain::DomainId;

use super::{LoadState, RequestToken, ViewSlot};

// =============================================================================
// Filters
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueBucket {
    Lt100,
    From100To500,
    From500To1000,
    Ge1000,
}

impl RevenueBucket {
    pub const ALL: [RevenueBucket; 4] = [
        RevenueBucket::Lt100,
        RevenueBucket::From100To500,
        RevenueBucket::From500To1000,
        RevenueBucket::Ge1000,
    ];

    /// Lower bound inclusive, upper bound exclusive.
    pub fn classify(revenue: f64) -> RevenueBucket {
        if revenue < 100.0 {
            RevenueBucket::Lt100
        } else if revenue < 500.0 {
            RevenueBucket::From100To500
        } else if revenue < 1000.0 {
            RevenueBucket::From500To1000
        } else {
            RevenueBucket::Ge1000
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RevenueBucket::Lt100 => "lt100",
            RevenueBucket::From100To500 => "100to500",
            RevenueBucket::From500To1000 => "500to1000",
            RevenueBucket::Ge1000 => "gte1000",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeoFilter {
    #[default]
    All,
    Exact(String),
}

impl GeoFilter {
    pub fn matches(&self, geography: &str) -> bool {
        match self {
            GeoFilter::All => true,
            GeoFilter::Exact(wanted) => wanted == geography,
        }
    }
}

// =============================================================================
// Display sort
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CustomerId,
    RiskScore,
    ChurnProbability,
    Revenue,
    Balance,
    Geography,
    PlanType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Ascending,
    Descending,
}

impl SortDir {
    fn flipped(self) -> SortDir {
        match self {
            SortDir::Ascending => SortDir::Descending,
            SortDir::Descending => SortDir::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySort {
    pub key: SortKey,
    pub dir: SortDir,
}

/// Snaps to the 5..=100 grid in steps of 5, rounding to the nearest step.
fn snap_top_n(pct: u32) -> u32 {
    let rounded = ((pct + 2) / 5) * 5;
    rounded.clamp(5, 100)
}

// =============================================================================
// Controller
// =============================================================================

#[derive(Debug)]
pub struct RiskRankingController {
    slot: ViewSlot<RiskRanking>,
    geography: GeoFilter,
    bucket: Option<RevenueBucket>,
    top_n_percent: u32,
    sort: Option<DisplaySort>,
}

impl RiskRankingController {
    pub fn new(default_top_n: u32) -> Self {
        Self {
            slot: ViewSlot::new("risk_ranking"),
            geography: GeoFilter::All,
            bucket: None,
            top_n_percent: snap_top_n(default_top_n),
            sort: None,
        }
    }

    pub async fn fetch(backend: &dyn Backend, domain: DomainId) -> ApiResult<RiskRanking> {
        backend.risk_ranking(domain).await
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.slot.begin_load()
    }

    pub fn finish_load(&mut self, token: RequestToken, result: ApiResult<RiskRanking>) -> bool {
        self.slot.finish_load(token, result)
    }

    /// Drops the snapshot. Geography values are domain-specific, so that
    /// filter resets to the wildcard; bucket, top-N, and sort are user
    /// preferences and survive.
    pub fn invalidate(&mut self) {
        self.slot.invalidate();
        self.geography = GeoFilter::All;
    }

    pub fn state(&self) -> &LoadState<RiskRanking> {
        self.slot.state()
    }

    pub fn model(&self) -> Option<&RiskRanking> {
        self.slot.ready()
    }

    // --- interactive parameters ------------------------------------------

    pub fn set_geography(&mut self, filter: GeoFilter) {
        self.geography = filter;
    }

    pub fn geography(&self) -> &GeoFilter {
        &self.geography
    }

    pub fn set_bucket(&mut self, bucket: Option<RevenueBucket>) {
        self.bucket = bucket;
    }

    pub fn bucket(&self) -> Option<RevenueBucket> {
        self.bucket
    }

    pub fn set_top_n_percent(&mut self, pct: u32) {
        self.top_n_percent = snap_top_n(pct);
    }

    pub fn top_n_percent(&self) -> u32 {
        self.top_n_percent
    }

    /// Selecting a new column starts ascending; re-selecting the current
    /// column flips direction.
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = Some(match self.sort {
            Some(current) if current.key == key => {
                DisplaySort { key, dir: current.dir.flipped() }
            }
            _ => DisplaySort { key, dir: SortDir::Ascending },
        });
    }

    pub fn sort(&self) -> Option<DisplaySort> {
        self.sort
    }

    // --- derived views ----------------------------------------------------

    /// Distinct geography values present in the snapshot, sorted, for the
    /// filter dropdown.
    pub fn geographies(&self) -> Vec<&str> {
        let Some(data) = self.slot.ready() else { return Vec::new() };
        let mut geos: Vec<&str> = data.customers.iter().map(|c| c.geography.as_str()).collect();
        geos.sort_unstable();
        geos.dedup();
        geos
    }

    /// Filtered rows ranked by risk score descending, cut to the top-N
    /// slice. Independent of the display sort.
    pub fn selection(&self) -> Vec<&CustomerRisk> {
        let Some(data) = self.slot.ready() else { return Vec::new() };
        let mut filtered: Vec<&CustomerRisk> = data
            .customers
            .iter()
            .filter(|c| self.geography.matches(&c.geography))
            .filter(|c| {
                self.bucket
                    .map_or(true, |b| RevenueBucket::classify(c.revenue_estimate) == b)
            })
            .collect();
        if filtered.is_empty() {
            return filtered;
        }
        filtered.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
        let share = (self.top_n_percent as f64 / 100.0) * filtered.len() as f64;
        let take = (share.ceil() as usize).max(1);
        filtered.truncate(take);
        filtered
    }

    /// The selection with the display sort applied.
    pub fn rows(&self) -> Vec<&CustomerRisk> {
        let mut rows = self.selection();
        if let Some(DisplaySort { key, dir }) = self.sort {
            rows.sort_by(|a, b| {
                let ord = match key {
                    SortKey::CustomerId => a.customer_id.cmp(&b.customer_id),
                    SortKey::RiskScore => a.risk_score.total_cmp(&b.risk_score),
                    SortKey::ChurnProbability => a.churn_probability.total_cmp(&b.churn_probability),
                    SortKey::Revenue => a.revenue_estimate.total_cmp(&b.revenue_estimate),
                    SortKey::Balance => a.balance.total_cmp(&b.balance),
                    SortKey::Geography => a.geography.cmp(&b.geography),
                    SortKey::PlanType => a.plan_type.cmp(&b.plan_type),
                };
                match dir {
                    SortDir::Ascending => ord,
                    SortDir::Descending => ord.reverse(),
                }
            });
        }
        rows
    }
}

// =============================================================================
// Tests
// =============================================================================
