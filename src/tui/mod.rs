//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! Nothing animates, so the loop sleeps up to 500ms in `poll` and only
//! redraws after an event or a terminal resize. All pending events are
//! drained before the next draw.

mod component;
mod components;
mod event;
mod ui;

use std::io::stdout;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use log::info;
use ratatui::DefaultTerminal;

use crate::core::action::{Effect, update};
use crate::core::state::App;
use crate::tui::components::TreeViewState;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const IDLE_POLL: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states, one per sidebar panel
    pub registry_view: TreeViewState,
    pub hierarchy_view: TreeViewState,
    /// Sidebar width in columns
    pub sidebar_width: u16,
}

impl TuiState {
    pub fn new(sidebar_width: u16) -> Self {
        Self {
            registry_view: TreeViewState::default(),
            hierarchy_view: TreeViewState::default(),
            sidebar_width,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), Hide)?;
        info!("Terminal modes enabled (hidden cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show);
    }
}

/// Run the event loop until the user quits.
pub fn run(mut app: App, sidebar_width: u16) -> std::io::Result<()> {
    let mut tui = TuiState::new(sidebar_width);

    let mut terminal = ratatui::init();
    let result = TerminalModeGuard::new()
        .and_then(|_guard| event_loop(&mut terminal, &mut app, &mut tui));
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    tui: &mut TuiState,
) -> std::io::Result<()> {
    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, app, tui))?;
            needs_redraw = false;
        }

        let Some(first_event) = poll_event_timeout(IDLE_POLL)? else {
            continue;
        };
        needs_redraw = true;

        // Drain everything pending before the next draw
        let mut pending = vec![first_event];
        while let Some(event) = poll_event_immediate()? {
            pending.push(event);
        }

        for event in pending {
            let TuiEvent::Action(action) = event else {
                // Resize just needs a redraw (already flagged above)
                continue;
            };
            if update(app, action) == Effect::Quit {
                info!("Quit requested");
                return Ok(());
            }
        }
    }
}
