//! # Native Boundary
//!
//! Logik's simulation lives in a separately built library that exposes a
//! small C ABI:
//!
//! ```text
//! test()                                   -> void
//! test2(i: i32)                            -> void
//! add(a: i32, b: i32)                      -> i32
//! do_cool_stuff(stuff: *mut TransferStruct) -> void
//!
//! TransferStruct { id: i32, payload: *const c_char }   // #[repr(C)]
//! ```
//!
//! The library is found by a logical name (see [`resolve_library_path`]) and
//! all four symbols are resolved when it loads. A missing file or symbol is a
//! [`NativeCallError`] the binary treats as fatal at startup.
//!
//! The builtin engine implements the same ABI in-process and is used when no
//! library is available.

mod abi;
mod builtin;
mod engine;
mod library;

use log::info;

use crate::EngineKind;

pub use abi::{Symbols, Transfer, TransferStruct};
pub use engine::{
    DiagnosticsReport, NativeCallError, NativeEngine, SimulationEngine, payload_cstring,
    run_diagnostics,
};
pub use library::{DEFAULT_LIBRARY, NativeLibrary, resolve_library_path};

/// Build the engine selected by configuration.
pub fn build_engine(kind: EngineKind, library: &str) -> Result<Box<dyn SimulationEngine>, NativeCallError> {
    let engine = match kind {
        EngineKind::Native => NativeEngine::load(library)?,
        EngineKind::Builtin => NativeEngine::builtin(),
    };
    info!("Using simulation engine: {}", engine.name());
    Ok(Box::new(engine))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_builtin_engine() {
        let engine = build_engine(EngineKind::Builtin, "ignored").unwrap();
        assert_eq!(engine.name(), "builtin");
        assert_eq!(engine.add(-3, 3), Ok(0));
    }

    #[test]
    fn test_build_native_engine_without_library_fails() {
        let result = build_engine(EngineKind::Native, "/definitely/missing/logik_simulation");
        assert!(matches!(result, Err(NativeCallError::LoadFailed { .. })));
    }
}
