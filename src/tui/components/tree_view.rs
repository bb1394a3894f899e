//! # TreeView Component
//!
//! Renders the visible rows of a [`TreeStore`] as an indented list with
//! expanders and icon glyphs.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `TreeViewState` lives in `TuiState`, one per sidebar panel
//! - `TreeView` is created each frame with the borrowed store and state
//!
//! The store owns selection and expansion. The list state here only keeps
//! the scroll offset ratatui needs between frames.

use std::fmt::Debug;
use std::hash::Hash;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::projection::{Row, TreeStore};
use crate::tui::component::Component;

const INDENT: &str = "  ";

/// Persistent scroll state for one tree view.
#[derive(Debug, Default)]
pub struct TreeViewState {
    pub list_state: ListState,
}

/// Transient render wrapper for a tree view.
pub struct TreeView<'a, K> {
    store: &'a TreeStore<K>,
    state: &'a mut TreeViewState,
}

impl<'a, K> TreeView<'a, K>
where
    K: Copy + Eq + Hash + Debug,
{
    pub fn new(store: &'a TreeStore<K>, state: &'a mut TreeViewState) -> Self {
        Self { store, state }
    }
}

/// Glyph for a symbolic icon name.
pub fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "folder" => "▣",
        "x-office-document" => "▢",
        "" => " ",
        _ => "·",
    }
}

/// Cut `text` to `max_width` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn row_line<K>(row: &Row<K>, has_children: bool, width: usize) -> Line<'static> {
    let expander = match (has_children, row.expanded) {
        (false, _) => "  ",
        (true, true) => "▾ ",
        (true, false) => "▸ ",
    };
    let prefix = format!("{}{}{} ", INDENT.repeat(row.depth), expander, icon_glyph(&row.icon));
    let label = truncate_to_width(&row.label, width.saturating_sub(prefix.width()));
    Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::DarkGray)),
        Span::raw(label),
    ])
}

impl<K> Component for TreeView<'_, K>
where
    K: Copy + Eq + Hash + Debug,
{
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let rows = self.store.rows();
        if rows.is_empty() {
            let empty = Paragraph::new("(empty)")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = self
            .store
            .visible()
            .into_iter()
            .map(|pos| {
                let row = &rows[pos];
                let has_children = rows.get(pos + 1).is_some_and(|next| next.depth > row.depth);
                ListItem::new(row_line(row, has_children, inner_width))
            })
            .collect();

        self.state
            .list_state
            .select(self.store.selected_visible_index());
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hierarchy::NodeId;
    use crate::test_support::{demo_hierarchy, demo_registry};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered_lines<K>(store: &TreeStore<K>, width: u16, height: u16) -> Vec<String>
    where
        K: Copy + Eq + Hash + Debug,
    {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = TreeViewState::default();
        terminal
            .draw(|f| TreeView::new(store, &mut state).render(f, f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_registry_renders_folders_and_entries() {
        let registry = demo_registry();
        let store = TreeStore::attach(&registry);
        let lines = rendered_lines(&store, 40, 10);
        assert!(lines[1].contains("▾ ▣ Test folder 1"));
        assert!(lines[2].contains("    ▢ Test comp 1"));
        assert!(lines[5].contains("▾ ▣ Test folder 2"));
        assert!(lines[8].contains("Another test comp 3"));
    }

    #[test]
    fn test_collapsed_rows_are_hidden() {
        let h = demo_hierarchy();
        let mut store = TreeStore::attach(&h);
        let comp2: NodeId = h.get(h.root()).unwrap().children()[1];
        store.set_expanded(comp2, false);
        let text = rendered_lines(&store, 40, 9).join("\n");
        assert!(text.contains("▸ ▢ Test Comp 2"));
        assert!(!text.contains("Test Nested Comp 2"));
        assert!(text.contains("Test Comp 3"));
    }

    #[test]
    fn test_long_labels_are_truncated() {
        let registry = demo_registry();
        let store = TreeStore::attach(&registry);
        let lines = rendered_lines(&store, 16, 10);
        assert!(lines[8].contains('…'));
    }

    #[test]
    fn test_selected_row_is_highlighted() {
        let registry = demo_registry();
        let mut store = TreeStore::attach(&registry);
        store.select_next();
        let backend = TestBackend::new(30, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = TreeViewState::default();
        terminal
            .draw(|f| TreeView::new(&store, &mut state).render(f, f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        assert!(buffer[(5, 2)].modifier.contains(Modifier::REVERSED));
        assert!(!buffer[(5, 1)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語の部品", 5), "日本…");
        assert_eq!(truncate_to_width("anything", 0), "");
    }

    #[test]
    fn test_icon_glyphs() {
        assert_eq!(icon_glyph("folder"), "▣");
        assert_eq!(icon_glyph("x-office-document"), "▢");
        assert_eq!(icon_glyph("chip"), "·");
    }
}
