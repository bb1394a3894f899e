//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields, copied from `App`
//! each frame:
//! - `TitleBar`: application name, engine, selection path
//! - `Notebook`: editor tabs and the active page
//! - `StatusBar`: status or error line plus key help
//!
//! ### Stateful Components (Persistent State + Transient Wrapper)
//!
//! - `TreeView` renders a `TreeStore` and borrows a `TreeViewState` that
//!   survives between frames in `TuiState`.
//!
//! Components never reach into `App` themselves. `ui::draw_ui` hands
//! them exactly what they show, which keeps each one testable with a
//! `TestBackend` alone.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs         (this file)
//! ├── title_bar.rs   (top line)
//! ├── tree_view.rs   (sidebar trees)
//! ├── notebook.rs    (editor tabs)
//! └── status_bar.rs  (bottom line)
//! ```

mod notebook;
mod status_bar;
mod title_bar;
mod tree_view;

pub use notebook::Notebook;
pub use status_bar::StatusBar;
pub use title_bar::TitleBar;
pub use tree_view::{TreeView, TreeViewState};
