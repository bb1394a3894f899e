//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;

use crate::core::description::Workspace;
use crate::core::hierarchy::Hierarchy;
use crate::core::registry::ComponentRegistry;
use crate::core::state::App;
use crate::native::{NativeCallError, NativeEngine, SimulationEngine, Transfer};

pub fn demo_registry() -> ComponentRegistry {
    ComponentRegistry::build(&Workspace::demo().folders)
}

pub fn demo_hierarchy() -> Hierarchy {
    Hierarchy::build(&Workspace::demo().hierarchy)
}

/// An engine that records every call and can be told to fail `add`.
#[derive(Default)]
pub struct RecordingEngine {
    pub calls: RefCell<Vec<String>>,
    pub fail_add: bool,
}

impl SimulationEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn test(&self) -> Result<(), NativeCallError> {
        self.calls.borrow_mut().push("test".to_string());
        Ok(())
    }

    fn test2(&self, i: i32) -> Result<(), NativeCallError> {
        self.calls.borrow_mut().push(format!("test2({i})"));
        Ok(())
    }

    fn add(&self, a: i32, b: i32) -> Result<i32, NativeCallError> {
        self.calls.borrow_mut().push(format!("add({a}, {b})"));
        if self.fail_add {
            return Err(NativeCallError::MissingSymbol {
                symbol: "add".to_string(),
                reason: "disabled in test".to_string(),
            });
        }
        Ok(a.wrapping_add(b))
    }

    fn do_cool_stuff(&self, transfer: &mut Transfer<'_>) -> Result<(), NativeCallError> {
        self.calls
            .borrow_mut()
            .push(format!("do_cool_stuff({})", transfer.id()));
        Ok(())
    }
}

/// The demo workspace backed by the builtin engine.
pub fn test_app() -> App {
    App::new(&Workspace::demo(), Box::new(NativeEngine::builtin()))
}
