//! Process configuration, resolved once at startup from environment
//! variables. Every knob has a default that works against a local backend.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::app::Theme;
use crate::domain::DomainId;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL every endpoint path is joined onto, without trailing slash.
    pub api_base: String,
    /// Domain used when a caller does not name one explicitly.
    pub default_domain: DomainId,
    /// Total per-request deadline; expiry aborts the request.
    pub request_timeout_ms: u64,
    /// Budget submitted with portfolio optimization requests.
    pub optimizer_budget: f64,
    /// Cadence of the driver's refresh loop.
    pub refresh_secs: u64,
    /// Initial top-N percent for the risk ranking view.
    pub top_n_percent: u32,
    /// Initial UI theme.
    pub theme: Theme,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("API_BASE")
                .unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string())
                .trim_end_matches('/')
                .to_string(),
            default_domain: std::env::var("DEFAULT_DOMAIN")
                .ok()
                .and_then(|v| DomainId::parse(&v))
                .unwrap_or(DomainId::Telecom),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15_000),
            optimizer_budget: std::env::var("OPTIMIZER_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50_000.0),
            refresh_secs: std::env::var("REFRESH_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            top_n_percent: std::env::var("TOP_N_PCT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            theme: std::env::var("THEME")
                .ok()
                .and_then(|v| Theme::parse(&v))
                .unwrap_or(Theme::Dark),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Short stable digest of the resolved configuration, recorded in the
    /// run manifest so log runs can be tied back to their settings.
    pub fn fingerprint(&self) -> String {
        let encoded = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(encoded.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..16].to_string()
    }
}
