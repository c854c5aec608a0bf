use crate::logging::Level;

use super::events::{AppEvent, Command};
use super::state::AppState;

/// What a single `reduce` call produced: the commands to interpret and the
/// state fingerprint after the event was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducerOutput {
    pub commands: Vec<Command>,
    pub state_hash: u64,
}

/// Applies one event to the state and returns the commands it implies.
///
/// Pure apart from the `&mut` on `state`: no IO, no clocks. Selecting the
/// page or domain that is already active consumes the event (seq still
/// advances) but emits no commands, so redundant clicks never refetch.
pub fn reduce(state: &mut AppState, event: AppEvent) -> ReducerOutput {
    let mut commands = Vec::new();
    state.seq += 1;

    match event {
        AppEvent::PageSelected(page) => {
            if page != state.page {
                state.page = page;
                commands.push(Command::LoadView(page));
            }
        }
        AppEvent::DomainSelected(domain) => {
            if domain != state.domain {
                state.domain = domain;
                // Invalidate strictly before reload: stale responses must be
                // unroutable before any new request exists.
                commands.push(Command::InvalidateViews);
                commands.push(Command::LoadView(state.page));
            }
        }
        AppEvent::ThemeToggled => {
            state.theme = state.theme.toggled();
            commands.push(Command::ApplyTheme(state.theme));
            commands.push(Command::Log {
                level: Level::Debug,
                msg: format!("theme -> {}", state.theme.as_str()),
            });
        }
        AppEvent::RefreshRequested => {
            commands.push(Command::Log {
                level: Level::Info,
                msg: format!("refresh {}", state.page.as_str()),
            });
            commands.push(Command::LoadView(state.page));
        }
    }

    ReducerOutput {
        commands,
        state_hash: state.hash(),
    }
}
