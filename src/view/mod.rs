//! View controllers and the load-state machinery they share.
//!
//! Every page follows the same lifecycle: `idle → loading → ready | errored`.
//! Loads are split-phase: `begin_load()` synchronously bumps the view's
//! request token and enters `loading`; the fetch is awaited outside any
//! borrow of the controller; `finish_load(token, result)` applies the outcome
//! only if the token is still current. A resolution carrying a stale token is
//! discarded silently (logged and counted), which is the whole of the
//! "last request wins" guarantee.

pub mod features;
pub mod overview;
pub mod performance;
pub mod playbook;
pub mod risk;
pub mod simulate;

pub use features::FeatureImportanceController;
pub use overview::OverviewController;
pub use performance::ModelPerformanceController;
pub use playbook::PlaybookController;
pub use risk::RiskRankingController;
pub use simulate::{AbSimulator, RoiSimulator, SimPhase, Simulator};

use crate::api::{ApiError, ApiResult};
use crate::logging;

// =============================================================================
// Load state
// =============================================================================

#[derive(Debug)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Errored(ApiError),
}

impl<T> LoadState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, LoadState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            LoadState::Errored(err) => Some(err),
            _ => None,
        }
    }

    /// Phase tag for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Ready(_) => "ready",
            LoadState::Errored(_) => "errored",
        }
    }
}

// =============================================================================
// Request tokens
// =============================================================================

/// Opaque handle tying an in-flight fetch to the `begin_load` that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Strictly monotonic per-view token counter. A token is current only until
/// the next `begin`.
#[derive(Debug, Default)]
pub struct RequestGuard {
    latest: u64,
    superseded: u64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    /// Count of resolutions discarded as stale.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    fn note_superseded(&mut self) {
        self.superseded += 1;
    }
}

// =============================================================================
// View slot: guard + load state for one logical view
// =============================================================================

#[derive(Debug)]
pub struct ViewSlot<T> {
    view: &'static str,
    guard: RequestGuard,
    state: LoadState<T>,
}

impl<T> ViewSlot<T> {
    pub fn new(view: &'static str) -> Self {
        Self {
            view,
            guard: RequestGuard::new(),
            state: LoadState::Idle,
        }
    }

    pub fn view(&self) -> &'static str {
        self.view
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn ready(&self) -> Option<&T> {
        self.state.ready()
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self.state {
            LoadState::Ready(ref mut value) => Some(value),
            _ => None,
        }
    }

    pub fn superseded(&self) -> u64 {
        self.guard.superseded()
    }

    /// Enters `loading`, discarding any prior result, and issues the token
    /// the matching `finish_load` must present.
    pub fn begin_load(&mut self) -> RequestToken {
        let from = self.state.name();
        self.state = LoadState::Loading;
        logging::log_view_transition(self.view, from, "loading");
        self.guard.begin()
    }

    /// Bumps the token without touching the current state. Used for
    /// follow-up calls (optimize) that must keep rows visible while pending.
    pub fn begin_request(&mut self) -> RequestToken {
        self.guard.begin()
    }

    /// True if the token is still current; otherwise records the
    /// supersession and tells the caller to drop the resolution.
    pub fn accept(&mut self, token: RequestToken) -> bool {
        if self.guard.is_current(token) {
            return true;
        }
        self.guard.note_superseded();
        logging::log_supersession(self.view, token.value(), self.guard.latest());
        logging::agg_increment("supersession");
        false
    }

    /// Applies a fetch outcome if `token` is still current. Returns whether
    /// the outcome was applied.
    pub fn finish_load(&mut self, token: RequestToken, result: ApiResult<T>) -> bool {
        if !self.accept(token) {
            return false;
        }
        let from = self.state.name();
        self.state = match result {
            Ok(value) => {
                logging::agg_increment("view_load");
                LoadState::Ready(value)
            }
            Err(err) => LoadState::Errored(err),
        };
        logging::log_view_transition(self.view, from, self.state.name());
        true
    }

    /// Drops the snapshot and bumps the token so any in-flight fetch lands
    /// stale. Domain switches call this on every view.
    pub fn invalidate(&mut self) {
        let from = self.state.name();
        self.guard.begin();
        self.state = LoadState::Idle;
        logging::log_view_transition(self.view, from, "idle");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> ViewSlot<u32> {
        ViewSlot::new("test_view")
    }

    #[test]
    fn test_tokens_increase_strictly() {
        let mut guard = RequestGuard::new();
        let a = guard.begin();
        let b = guard.begin();
        let c = guard.begin();
        assert!(a.value() < b.value());
        assert!(b.value() < c.value());
    }

    #[test]
    fn test_token_current_only_until_next_begin() {
        let mut guard = RequestGuard::new();
        let a = guard.begin();
        assert!(guard.is_current(a));
        let b = guard.begin();
        assert!(!guard.is_current(a));
        assert!(guard.is_current(b));
    }

    #[test]
    fn test_begin_load_discards_prior_result_immediately() {
        let mut slot = slot();
        let t = slot.begin_load();
        assert!(slot.finish_load(t, Ok(7)));
        assert_eq!(slot.ready(), Some(&7));

        slot.begin_load();
        assert!(slot.state().is_loading(), "no stale display while reloading");
        assert_eq!(slot.ready(), None);
    }

    #[test]
    fn test_stale_resolution_is_discarded() {
        let mut slot = slot();
        let first = slot.begin_load();
        let second = slot.begin_load();

        assert!(!slot.finish_load(first, Ok(1)), "superseded token must not apply");
        assert!(slot.state().is_loading(), "stale success leaves state untouched");
        assert_eq!(slot.superseded(), 1);

        assert!(slot.finish_load(second, Ok(2)));
        assert_eq!(slot.ready(), Some(&2));
    }

    #[test]
    fn test_stale_error_is_discarded_too() {
        let mut slot = slot();
        let first = slot.begin_load();
        let second = slot.begin_load();
        let err = ApiError::Http { path: "/kpis".to_string(), status: 500 };

        assert!(!slot.finish_load(first, Err(err)));
        assert!(slot.finish_load(second, Ok(3)));
        assert_eq!(slot.ready(), Some(&3), "late failure of an old request is invisible");
    }

    #[test]
    fn test_error_outcome_is_stored_for_current_token() {
        let mut slot = slot();
        let t = slot.begin_load();
        let err = ApiError::Timeout { path: "/kpis".to_string(), timeout_ms: 15_000 };
        assert!(slot.finish_load(t, Err(err)));
        assert_eq!(slot.state().name(), "errored");
        assert_eq!(slot.state().error().map(|e| e.kind()), Some("timeout"));
    }

    #[test]
    fn test_invalidate_supersedes_in_flight_fetch() {
        let mut slot = slot();
        let t = slot.begin_load();
        slot.invalidate();
        assert!(slot.state().is_idle());
        assert!(!slot.finish_load(t, Ok(9)), "fetch begun before invalidate is stale");
        assert!(slot.state().is_idle());
    }

    #[test]
    fn test_begin_request_keeps_state_but_rotates_token() {
        let mut slot = slot();
        let load = slot.begin_load();
        assert!(slot.finish_load(load, Ok(5)));

        let follow_up = slot.begin_request();
        assert_eq!(slot.ready(), Some(&5), "rows stay visible during follow-up call");
        assert!(slot.accept(follow_up));
    }
}
