use crate::domain::DomainId;
use crate::logging::Level;

use super::state::{Page, Theme};

/// User-originated events. Everything that can change `AppState` goes
/// through one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    PageSelected(Page),
    DomainSelected(DomainId),
    ThemeToggled,
    RefreshRequested,
}

impl AppEvent {
    /// Tag used in audit records.
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::PageSelected(_) => "page_selected",
            AppEvent::DomainSelected(_) => "domain_selected",
            AppEvent::ThemeToggled => "theme_toggled",
            AppEvent::RefreshRequested => "refresh_requested",
        }
    }
}

/// Effects the reducer requests. The reducer never performs IO itself; the
/// session interprets these in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch the data backing a page and hand it to that page's controller.
    LoadView(Page),
    /// Drop every cached view and pending request; issued on domain switch
    /// so no response from the previous domain can surface afterwards.
    InvalidateViews,
    ApplyTheme(Theme),
    Log { level: Level, msg: String },
}
