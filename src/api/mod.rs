//! Typed HTTP access to the dashboard backend.
//!
//! One logical request maps to exactly one of {decoded payload, `ApiError`}.
//! The client applies a hard per-request deadline and classifies every
//! failure; it never retries, since staleness control above makes a late
//! retry worthless anyway.

pub mod backend;
pub mod types;

pub use backend::{Backend, HttpBackend};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

use crate::config::Config;
use crate::domain::DomainId;
use crate::logging::{self, v_str, ProfileScope};

// =============================================================================
// Error taxonomy
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Backend answered with a non-2xx status.
    #[error("{path} returned HTTP {status}")]
    Http { path: String, status: u16 },
    /// No response inside the deadline; the in-flight request was aborted.
    #[error("{path} timed out after {timeout_ms} ms")]
    Timeout { path: String, timeout_ms: u64 },
    /// DNS, connect, broken stream, or body decode failure.
    #[error("{path} transport failure: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Stable tag for logs and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Http { .. } => "http",
            ApiError::Timeout { .. } => "timeout",
            ApiError::Transport { .. } => "transport",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ApiError::Http { path, .. }
            | ApiError::Timeout { path, .. }
            | ApiError::Transport { path, .. } => path,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Client
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    default_domain: DomainId,
    timeout_ms: u64,
}

impl ApiClient {
    pub fn new(cfg: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base: cfg.api_base.clone(),
            default_domain: cfg.default_domain,
            timeout_ms: cfg.request_timeout_ms,
        }
    }

    /// GET `{base}{path}?domain=...`. An omitted domain falls back to the
    /// configured default.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        domain: Option<DomainId>,
    ) -> ApiResult<T> {
        let domain = domain.unwrap_or(self.default_domain);
        let url = format!("{}{}?domain={}", self.base, path, domain.as_str());
        self.execute(path, domain, self.http.get(&url)).await
    }

    /// POST `{base}{path}` with a JSON body; the body carries its own domain.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        domain: DomainId,
        body: &B,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base, path);
        self.execute(path, domain, self.http.post(&url).json(body)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        domain: DomainId,
        req: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let _scope = ProfileScope::with_context("api", "request", &[("path", v_str(path))]);
        let started = Instant::now();
        logging::agg_increment("request");

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(err) => return Err(self.fail(path, domain, started, None, err)),
        };

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            logging::log_request(path, domain.as_str(), Some(status), elapsed_ms(started), "http");
            logging::agg_increment("request_error");
            return Err(ApiError::Http { path: path.to_string(), status });
        }

        match resp.json::<T>().await {
            Ok(decoded) => {
                logging::log_request(path, domain.as_str(), Some(status), elapsed_ms(started), "ok");
                Ok(decoded)
            }
            Err(err) => Err(self.fail(path, domain, started, Some(status), err)),
        }
    }

    fn fail(
        &self,
        path: &str,
        domain: DomainId,
        started: Instant,
        status: Option<u16>,
        err: reqwest::Error,
    ) -> ApiError {
        let err = if err.is_timeout() {
            ApiError::Timeout {
                path: path.to_string(),
                timeout_ms: self.timeout_ms,
            }
        } else {
            ApiError::Transport {
                path: path.to_string(),
                source: err,
            }
        };
        logging::log_request(path, domain.as_str(), status, elapsed_ms(started), err.kind());
        logging::agg_increment("request_error");
        err
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_tags() {
        let http = ApiError::Http { path: "/kpis".to_string(), status: 503 };
        let timeout = ApiError::Timeout { path: "/kpis".to_string(), timeout_ms: 15_000 };
        assert_eq!(http.kind(), "http");
        assert_eq!(timeout.kind(), "timeout");
    }

    #[test]
    fn test_error_messages_name_path_and_detail() {
        let http = ApiError::Http { path: "/risk-ranking".to_string(), status: 500 };
        assert_eq!(http.to_string(), "/risk-ranking returned HTTP 500");
        assert_eq!(http.path(), "/risk-ranking");

        let timeout = ApiError::Timeout { path: "/kpis".to_string(), timeout_ms: 200 };
        assert_eq!(timeout.to_string(), "/kpis timed out after 200 ms");
    }
}
