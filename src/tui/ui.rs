use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Tabs;

use crate::core::state::{App, Panel};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{Notebook, StatusBar, TitleBar, TreeView};

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, body_area, status_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());
    let [sidebar_area, notebook_area] =
        Layout::horizontal([Length(tui.sidebar_width), Min(0)]).areas(body_area);

    TitleBar::new(app.engine.name().to_string(), app.selection_path()).render(frame, title_area);
    draw_sidebar(frame, sidebar_area, app, tui);
    Notebook::new(app.editor_tab).render(frame, notebook_area);
    StatusBar::new(app.status_message.clone(), app.error.clone()).render(frame, status_area);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    let [tabs_area, tree_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    let selected = Panel::ALL
        .iter()
        .position(|p| *p == app.active_panel)
        .unwrap_or(0);
    let tabs = Tabs::new(Panel::ALL.iter().map(|p| p.title()))
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, tabs_area);

    match app.active_panel {
        Panel::Components => {
            TreeView::new(app.registry.store(), &mut tui.registry_view)
                .render(frame, tree_area);
        }
        Panel::Hierarchy => {
            TreeView::new(app.hierarchy.store(), &mut tui.hierarchy_view)
                .render(frame, tree_area);
        }
    }
}
