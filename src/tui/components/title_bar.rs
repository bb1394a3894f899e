//! # TitleBar Component
//!
//! Top line showing the application name, the simulation engine in use, and
//! where the current selection sits.
//!
//! Stateless: every field is a prop copied from `App` each frame.
//!
//! The title text changes based on state:
//!
//! 1. **Selection**: `"Logik (engine: builtin) | Top comp / Test Comp 2"`
//! 2. **Default**: `"Logik (engine: builtin)"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

pub struct TitleBar {
    /// Engine name, e.g. `builtin` or the library path
    pub engine_name: String,
    /// Path of the selected node in the active panel
    pub selection: Option<String>,
}

impl TitleBar {
    pub fn new(engine_name: String, selection: Option<String>) -> Self {
        Self {
            engine_name,
            selection,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title_text = match &self.selection {
            Some(path) => format!("Logik (engine: {}) | {}", self.engine_name, path),
            None => format!("Logik (engine: {})", self.engine_name),
        };
        frame.render_widget(
            Span::styled(title_text, Style::default().add_modifier(Modifier::BOLD)),
            area,
        );
    }
}
