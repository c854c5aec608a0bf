//! Application state and its pure reducer.
//!
//! Global UI state (page, domain, theme) lives in one `AppState`; every
//! transition is an event fed through `reduce`, which mutates the state and
//! emits commands for the session layer to interpret. Nothing in here
//! performs IO, so transitions are testable in isolation and replayable from
//! an event log.

pub mod events;
pub mod reducer;
pub mod state;

pub use events::{AppEvent, Command};
pub use reducer::{reduce, ReducerOutput};
pub use state::{AppState, Page, Theme};
