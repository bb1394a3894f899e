//! # Notebook Component
//!
//! The editor area: a tab strip over the active editor page. Both editors
//! are placeholders for now.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use crate::core::state::EditorTab;
use crate::tui::component::Component;

pub struct Notebook {
    pub active: EditorTab,
}

impl Notebook {
    pub fn new(active: EditorTab) -> Self {
        Self { active }
    }
}

impl Component for Notebook {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [tabs_area, page_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

        let tabs = Tabs::new(EditorTab::ALL.iter().map(|t| t.title()))
            .select(self.active.index())
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, tabs_area);

        let page = Paragraph::new(format!("{} is not implemented yet", self.active.title()))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(page, page_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_notebook_shows_active_page() {
        let backend = TestBackend::new(60, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut notebook = Notebook::new(EditorTab::Package);
        terminal
            .draw(|f| notebook.render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Circuit editor"));
        assert!(text.contains("Package editor is not implemented yet"));
    }
}
