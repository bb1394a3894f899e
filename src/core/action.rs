//! # Actions
//!
//! Everything that can happen in Logik becomes an `Action`.
//! User presses `a`? That's `Action::AddUnderSelection`.
//! User presses `p`? That's `Action::RunDiagnostics`.
//!
//! The `update()` function takes the current state and an action,
//! mutates the state, and returns an `Effect` for the adapter to carry out.
//!
//! ```text
//! State + Action  →  update()  →  New State (+ Effect)
//! ```
//!
//! This makes everything testable without a terminal.

use log::{debug, error, info, warn};

use crate::core::description::{DEFAULT_ICON, HierarchyDescription};
use crate::core::registry::RegistryKey;
use crate::core::state::{App, Panel};
use crate::core::synced::SyncError;
use crate::native::run_diagnostics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SwitchPanel,
    NextEditorTab,
    PrevEditorTab,
    SelectNext,
    SelectPrevious,
    Expand,
    Collapse,
    ToggleExpanded,
    AddUnderSelection,
    RemoveSelection,
    MoveUp,
    MoveDown,
    RunDiagnostics,
    Resync,
}

/// What the adapter has to do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("Action: {:?}", action);
    match action {
        Action::Quit => return Effect::Quit,
        Action::SwitchPanel => {
            app.active_panel = app.active_panel.other();
            app.status_message = format!("{} panel", app.active_panel.title());
        }
        Action::NextEditorTab => app.editor_tab = app.editor_tab.next(),
        Action::PrevEditorTab => app.editor_tab = app.editor_tab.previous(),
        Action::SelectNext => match app.active_panel {
            Panel::Components => app.registry.store_mut().select_next(),
            Panel::Hierarchy => app.hierarchy.store_mut().select_next(),
        },
        Action::SelectPrevious => match app.active_panel {
            Panel::Components => app.registry.store_mut().select_previous(),
            Panel::Hierarchy => app.hierarchy.store_mut().select_previous(),
        },
        Action::Expand => match app.active_panel {
            Panel::Components => app.registry.store_mut().expand_selected(),
            Panel::Hierarchy => app.hierarchy.store_mut().expand_selected(),
        },
        Action::Collapse => match app.active_panel {
            Panel::Components => app.registry.store_mut().collapse_selected(),
            Panel::Hierarchy => app.hierarchy.store_mut().collapse_selected(),
        },
        Action::ToggleExpanded => match app.active_panel {
            Panel::Components => app.registry.store_mut().toggle_selected(),
            Panel::Hierarchy => app.hierarchy.store_mut().toggle_selected(),
        },
        Action::AddUnderSelection => add_under_selection(app),
        Action::RemoveSelection => remove_selection(app),
        Action::MoveUp => move_selection(app, -1),
        Action::MoveDown => move_selection(app, 1),
        Action::RunDiagnostics => match run_diagnostics(app.engine.as_ref()) {
            Ok(report) => {
                info!("Diagnostics: {report}");
                app.status_message = report.to_string();
                app.error = None;
            }
            Err(e) => {
                warn!("Diagnostics failed: {e}");
                app.error = Some(e.to_string());
            }
        },
        Action::Resync => {
            resync_all(app);
            app.status_message = "Tree views rebuilt".to_string();
        }
    }
    Effect::None
}

fn next_component_name(app: &mut App) -> String {
    let name = format!("New component {}", app.next_new);
    app.next_new += 1;
    name
}

fn add_under_selection(app: &mut App) {
    match app.active_panel {
        Panel::Components => {
            let Some(folder) = app.registry.selected_folder() else {
                app.status_message = "Select a folder to add a component to".to_string();
                return;
            };
            let name = next_component_name(app);
            let result = app.registry.add_entry(folder, name.clone(), DEFAULT_ICON, isize::MAX);
            if let Some(id) = settle(app, result) {
                let store = app.registry.store_mut();
                store.set_expanded(RegistryKey::Folder(folder), true);
                store.select(RegistryKey::Entry(id));
                app.status_message = format!("Added {name}");
            }
        }
        Panel::Hierarchy => {
            let parent = app
                .hierarchy
                .store()
                .selected()
                .unwrap_or_else(|| app.hierarchy.model().root());
            let name = next_component_name(app);
            let leaf = HierarchyDescription::leaf(name.clone(), DEFAULT_ICON);
            let result = app.hierarchy.insert_description(parent, &leaf, isize::MAX);
            if let Some(id) = settle(app, result) {
                let store = app.hierarchy.store_mut();
                store.set_expanded(parent, true);
                store.select(id);
                app.status_message = format!("Added {name}");
            }
        }
    }
}

fn remove_selection(app: &mut App) {
    match app.active_panel {
        Panel::Components => {
            let Some(key) = app.registry.store().selected() else {
                return;
            };
            let label = app.registry.store().row(key).map(|r| r.label.clone());
            let result = match key {
                RegistryKey::Folder(id) => app.registry.remove_folder(id),
                RegistryKey::Entry(id) => app.registry.remove_entry(id),
            };
            if settle(app, result).is_some() {
                app.status_message = format!("Removed {}", label.unwrap_or_default());
            }
        }
        Panel::Hierarchy => {
            let Some(node) = app.hierarchy.store().selected() else {
                return;
            };
            let result = app.hierarchy.delete_node(node);
            if let Some(freed) = settle(app, result) {
                app.status_message = format!("Removed {freed} instance(s)");
            }
        }
    }
}

fn move_selection(app: &mut App, delta: isize) {
    if app.active_panel != Panel::Hierarchy {
        app.status_message = "Only hierarchy nodes can be reordered".to_string();
        return;
    }
    let Some(node) = app.hierarchy.store().selected() else {
        return;
    };
    let Some(index) = app.hierarchy.model().index_in_parent(node) else {
        app.status_message = "The top component has no siblings".to_string();
        return;
    };
    let result = app.hierarchy.move_within(node, index as isize + delta);
    settle(app, result);
}

/// Fold a mutation result into the app: model errors become the status.
///
/// A desync is a bug. Debug builds panic on it; release builds keep it as a
/// sticky error and rebuild both views.
fn settle<T>(app: &mut App, result: Result<T, SyncError>) -> Option<T> {
    match result {
        Ok(value) => {
            app.error = None;
            Some(value)
        }
        Err(SyncError::Model(e)) => {
            warn!("Rejected edit: {e}");
            app.status_message = e.to_string();
            None
        }
        Err(SyncError::Desync(e)) => {
            error!("Tree view out of sync, rebuilding: {e}");
            if cfg!(debug_assertions) {
                panic!("tree view out of sync: {e}");
            }
            app.error = Some(e.to_string());
            resync_all(app);
            None
        }
    }
}

fn resync_all(app: &mut App) {
    app.registry.resync();
    app.hierarchy.resync();
}
