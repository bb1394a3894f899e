//! # StatusBar Component
//!
//! Bottom line: the sticky error if there is one, otherwise the last status
//! message, followed by key help.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub const HELP: &str =
    "↑↓ move  ←→ fold  Tab panel  [ ] editor  a add  d remove  J/K reorder  p diagnostics  q quit";

pub struct StatusBar {
    pub status_message: String,
    pub error: Option<String>,
}

impl StatusBar {
    pub fn new(status_message: String, error: Option<String>) -> Self {
        Self {
            status_message,
            error,
        }
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let message = match &self.error {
            Some(err) => Span::styled(format!("Error: {err}"), Style::default().fg(Color::Red)),
            None => Span::raw(self.status_message.clone()),
        };
        let line = Line::from(vec![
            message,
            Span::raw("  "),
            Span::styled(HELP, Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(bar: &mut StatusBar) -> String {
        let backend = TestBackend::new(160, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_error_replaces_status() {
        let mut bar = StatusBar::new("Added X".to_string(), Some("projection desync".to_string()));
        let text = render_text(&mut bar);
        assert!(text.starts_with("Error: projection desync"));
        assert!(!text.contains("Added X"));
    }

    #[test]
    fn test_status_and_help() {
        let mut bar = StatusBar::new("Hierarchy panel".to_string(), None);
        let text = render_text(&mut bar);
        assert!(text.starts_with("Hierarchy panel"));
        assert!(text.contains("q quit"));
    }
}
