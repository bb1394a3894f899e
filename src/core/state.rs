//! # Application State
//!
//! Core business state for Logik. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── registry: SyncedTree<ComponentRegistry>  // folders + their projection
//! ├── hierarchy: SyncedTree<Hierarchy>         // instances + their projection
//! ├── engine: Box<dyn SimulationEngine>        // native boundary
//! ├── active_panel: Panel                      // sidebar tab
//! ├── editor_tab: EditorTab                    // notebook tab
//! ├── status_message: String                   // status bar text
//! └── error: Option<String>                    // sticky error (desync etc.)
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::description::Workspace;
use crate::core::hierarchy::Hierarchy;
use crate::core::registry::{ComponentRegistry, RegistryKey};
use crate::core::synced::SyncedTree;
use crate::native::SimulationEngine;

/// Sidebar tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Components,
    Hierarchy,
}

impl Panel {
    pub const ALL: [Panel; 2] = [Panel::Components, Panel::Hierarchy];

    pub fn title(self) -> &'static str {
        match self {
            Panel::Components => "Components",
            Panel::Hierarchy => "Hierarchy",
        }
    }

    pub fn other(self) -> Panel {
        match self {
            Panel::Components => Panel::Hierarchy,
            Panel::Hierarchy => Panel::Components,
        }
    }
}

/// Notebook tab. Both editors are placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTab {
    #[default]
    Circuit,
    Package,
}

impl EditorTab {
    pub const ALL: [EditorTab; 2] = [EditorTab::Circuit, EditorTab::Package];

    pub fn title(self) -> &'static str {
        match self {
            EditorTab::Circuit => "Circuit editor",
            EditorTab::Package => "Package editor",
        }
    }

    pub fn index(self) -> usize {
        match self {
            EditorTab::Circuit => 0,
            EditorTab::Package => 1,
        }
    }

    pub fn next(self) -> EditorTab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> EditorTab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct App {
    pub registry: SyncedTree<ComponentRegistry>,
    pub hierarchy: SyncedTree<Hierarchy>,
    pub engine: Box<dyn SimulationEngine>,
    pub active_panel: Panel,
    pub editor_tab: EditorTab,
    pub status_message: String,
    /// Sticky error shown until the next successful action.
    pub error: Option<String>,
    /// Suffix for the next "New component N" name.
    pub(crate) next_new: u32,
}

impl App {
    pub fn new(workspace: &Workspace, engine: Box<dyn SimulationEngine>) -> Self {
        Self {
            registry: SyncedTree::attach(ComponentRegistry::build(&workspace.folders)),
            hierarchy: SyncedTree::attach(Hierarchy::build(&workspace.hierarchy)),
            status_message: format!("Welcome to Logik! Engine: {}", engine.name()),
            engine,
            active_panel: Panel::default(),
            editor_tab: EditorTab::default(),
            error: None,
            next_new: 1,
        }
    }

    /// Human-readable location of the current selection in the active panel.
    pub fn selection_path(&self) -> Option<String> {
        match self.active_panel {
            Panel::Components => {
                let model = self.registry.model();
                match self.registry.store().selected()? {
                    RegistryKey::Folder(id) => model.folder(id).map(|f| f.name.clone()),
                    RegistryKey::Entry(id) => {
                        let folder = model.folder(model.folder_of(id)?)?;
                        let entry = model.entry(id)?;
                        Some(format!("{} / {}", folder.name, entry.name))
                    }
                }
            }
            Panel::Hierarchy => {
                let id = self.hierarchy.store().selected()?;
                let path = self.hierarchy.model().path_of(id);
                (!path.is_empty()).then(|| path.join(" / "))
            }
        }
    }
}
