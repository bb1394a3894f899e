use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::action::Action;

/// TUI-specific input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiEvent {
    /// A key that maps onto a core action
    Action(Action),
    /// Terminal size changed; only needs a redraw
    Resize,
}

/// Translate a key press into a core action.
///
/// Returns `None` for keys Logik doesn't bind and for release/repeat
/// events some terminals report.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let action = match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Action::Quit,
        (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => Action::Quit,
        (_, KeyCode::Tab) | (_, KeyCode::BackTab) => Action::SwitchPanel,
        (_, KeyCode::Char(']')) => Action::NextEditorTab,
        (_, KeyCode::Char('[')) => Action::PrevEditorTab,
        (KeyModifiers::SHIFT, KeyCode::Up) | (_, KeyCode::Char('K')) => Action::MoveUp,
        (KeyModifiers::SHIFT, KeyCode::Down) | (_, KeyCode::Char('J')) => Action::MoveDown,
        (_, KeyCode::Up) | (_, KeyCode::Char('k')) => Action::SelectPrevious,
        (_, KeyCode::Down) | (_, KeyCode::Char('j')) => Action::SelectNext,
        (_, KeyCode::Right) | (_, KeyCode::Char('l')) => Action::Expand,
        (_, KeyCode::Left) | (_, KeyCode::Char('h')) => Action::Collapse,
        (_, KeyCode::Enter) | (_, KeyCode::Char(' ')) => Action::ToggleExpanded,
        (_, KeyCode::Char('a')) | (_, KeyCode::Insert) => Action::AddUnderSelection,
        (_, KeyCode::Char('d')) | (_, KeyCode::Delete) => Action::RemoveSelection,
        (_, KeyCode::Char('p')) => Action::RunDiagnostics,
        (_, KeyCode::Char('r')) => Action::Resync,
        _ => return None,
    };
    Some(action)
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: Duration) -> io::Result<Option<TuiEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key_event) => {
            log::debug!(
                "Key event: {:?} with modifiers {:?}",
                key_event.code,
                key_event.modifiers
            );
            Ok(map_key(key_event).map(TuiEvent::Action))
        }
        Event::Resize(_, _) => Ok(Some(TuiEvent::Resize)),
        _ => Ok(None),
    }
}

/// Poll for an event without blocking
pub fn poll_event_immediate() -> io::Result<Option<TuiEvent>> {
    poll_event_timeout(Duration::ZERO)
}
