//! Logik library exports for the shell binary and integration tests

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod native;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Which simulation engine backs the native boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Load the simulation library from disk.
    #[default]
    Native,
    /// Use the in-process reference implementation of the boundary.
    Builtin,
}
