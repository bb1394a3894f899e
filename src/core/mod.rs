//! # Core Application Logic
//!
//! This module contains Logik's data model and the binding contract between
//! that model and any tree widget that displays it.
//! It knows nothing about any specific UI technology. Native calls go
//! through the `SimulationEngine` trait held by `App`.
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!                    │             CORE             │
//!                    │         (this module)        │
//!                    │                              │
//!                    │  • registry  (folders)       │
//!                    │  • hierarchy (arena tree)    │
//!                    │  • projection (row store)    │
//!                    │  • synced (model + store)    │
//!                    │  • State / Action / update() │
//!                    └──────────────┬───────────────┘
//!                                   │
//!            ┌──────────────────────┼──────────────────────┐
//!            ▼                      ▼                      ▼
//!     ┌────────────┐         ┌────────────┐         ┌────────────┐
//!     │    TUI     │         │  main.rs   │         │   tests    │
//!     │  Adapter   │         │  (startup, │         │ (headless) │
//!     │ (ratatui)  │         │   config)  │         │            │
//!     └────────────┘         └────────────┘         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: the `TreeSource` trait, structural change notifications, `TreeError`
//! - [`hierarchy`]: the instantiation hierarchy, an arena of generational node ids
//! - [`registry`]: component folders and their entries
//! - [`description`]: nested and id-referencing descriptions, workspace loading
//! - [`projection`]: `TreeStore`, the row projection a tree widget renders
//! - [`synced`]: `SyncedTree`, a model bound to its projection
//! - [`state`]: the `App` struct, all application state in one place
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`config`]: configuration file, env and CLI resolution

pub mod action;
pub mod config;
pub mod description;
pub mod hierarchy;
pub mod projection;
pub mod registry;
pub mod state;
pub mod synced;
pub mod tree;
