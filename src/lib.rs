//! Client-side orchestration layer for a churn-prediction dashboard.
//!
//! The crate talks to the dashboard's REST backend, derives everything the
//! seven views display, and keeps view state coherent under rapid page and
//! domain switching. No rendering lives here: controllers expose plain data
//! shapes that a frontend (or the headless driver binary) reads off.

pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod logging;
pub mod metrics;
pub mod view;

pub use config::Config;
pub use dashboard::DashboardSession;
pub use domain::DomainId;
