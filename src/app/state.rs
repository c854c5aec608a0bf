use serde::{Deserialize, Serialize};

use crate::domain::DomainId;

// ============================================================
// Pages
// ============================================================

/// The seven dashboard pages. Navigation is a closed set: there is no
/// routing table, only this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Overview,
    ModelPerformance,
    FeatureImportance,
    RiskRanking,
    RetentionPlaybook,
    RoiSimulator,
    AbTesting,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Overview,
        Page::ModelPerformance,
        Page::FeatureImportance,
        Page::RiskRanking,
        Page::RetentionPlaybook,
        Page::RoiSimulator,
        Page::AbTesting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::ModelPerformance => "model_performance",
            Page::FeatureImportance => "feature_importance",
            Page::RiskRanking => "risk_ranking",
            Page::RetentionPlaybook => "retention_playbook",
            Page::RoiSimulator => "roi_simulator",
            Page::AbTesting => "ab_testing",
        }
    }

    /// Human-facing title, as rendered in the navigation rail.
    pub fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::ModelPerformance => "Model Performance",
            Page::FeatureImportance => "Feature Importance",
            Page::RiskRanking => "Risk Ranking",
            Page::RetentionPlaybook => "Retention Playbook",
            Page::RoiSimulator => "ROI Simulator",
            Page::AbTesting => "A/B Testing",
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// Theme
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(s: &str) -> Option<Theme> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

// ============================================================
// App state
// ============================================================

/// Global state shared by every page: which page is active, which customer
/// domain feeds it, and the theme. `seq` counts consumed events so audit
/// records can be ordered and replay verified.
#[derive(Debug, Clone)]
pub struct AppState {
    pub page: Page,
    pub domain: DomainId,
    pub theme: Theme,
    pub seq: u64,
}

impl AppState {
    pub fn new(domain: DomainId, theme: Theme) -> Self {
        Self {
            page: Page::Overview,
            domain,
            theme,
            seq: 0,
        }
    }

    /// Stable fingerprint of the current state, recorded with each audit
    /// event. Two sessions that consumed the same event stream produce the
    /// same sequence of hashes.
    pub fn hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut h = DefaultHasher::new();
        self.page.as_str().hash(&mut h);
        self.domain.as_str().hash(&mut h);
        self.theme.as_str().hash(&mut h);
        self.seq.hash(&mut h);
        h.finish()
    }
}
