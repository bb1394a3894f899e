use std::ffi::CString;
use std::fmt;
use std::path::Path;

use log::{debug, info, warn};

use crate::native::abi::{Symbols, Transfer};
use crate::native::builtin;
use crate::native::library::{NativeLibrary, resolve_library_path};

/// Failures at the native boundary.
///
/// The ABI has no status channel, so everything here is detected on the
/// Rust side: at load time, or while preparing or checking a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCallError {
    LoadFailed { path: String, reason: String },
    MissingSymbol { symbol: String, reason: String },
    InvalidPayload(String),
}

impl fmt::Display for NativeCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeCallError::LoadFailed { path, reason } => {
                write!(f, "failed to load simulation library {path}: {reason}")
            }
            NativeCallError::MissingSymbol { symbol, reason } => {
                write!(f, "simulation library lacks symbol `{symbol}`: {reason}")
            }
            NativeCallError::InvalidPayload(msg) => write!(f, "invalid transfer payload: {msg}"),
        }
    }
}

impl std::error::Error for NativeCallError {}

/// Encode a payload for [`Transfer`]. Interior NULs cannot cross the ABI.
pub fn payload_cstring(payload: &str) -> Result<CString, NativeCallError> {
    CString::new(payload).map_err(|e| {
        NativeCallError::InvalidPayload(format!("NUL byte at offset {}", e.nul_position()))
    })
}

/// The four calls the simulation boundary offers.
///
/// Every method returns a `Result` even though the current ABI cannot
/// report failure, so status-returning exports can be added later.
pub trait SimulationEngine {
    fn name(&self) -> &str;
    fn test(&self) -> Result<(), NativeCallError>;
    fn test2(&self, i: i32) -> Result<(), NativeCallError>;
    fn add(&self, a: i32, b: i32) -> Result<i32, NativeCallError>;
    fn do_cool_stuff(&self, transfer: &mut Transfer<'_>) -> Result<(), NativeCallError>;
}

/// Calls through a resolved [`Symbols`] table.
pub struct NativeEngine {
    symbols: Symbols,
    origin: String,
    // Keeps loaded code mapped. `None` for the builtin table.
    _library: Option<NativeLibrary>,
}

impl NativeEngine {
    /// Load the library named `name` (logical name or path).
    pub fn load(name: &str) -> Result<Self, NativeCallError> {
        let path = resolve_library_path(name);
        Self::load_path(&path)
    }

    pub fn load_path(path: &Path) -> Result<Self, NativeCallError> {
        let library = NativeLibrary::load(path)?;
        info!("Simulation library ready: {}", library.path().display());
        Ok(Self {
            symbols: library.symbols(),
            origin: library.path().display().to_string(),
            _library: Some(library),
        })
    }

    pub fn builtin() -> Self {
        Self {
            symbols: builtin::symbols(),
            origin: "builtin".to_string(),
            _library: None,
        }
    }
}

impl SimulationEngine for NativeEngine {
    fn name(&self) -> &str {
        &self.origin
    }

    fn test(&self) -> Result<(), NativeCallError> {
        debug!("native call: test()");
        // SAFETY: `test` takes no arguments and the symbol table outlives
        // the call.
        unsafe { (self.symbols.test)() };
        Ok(())
    }

    fn test2(&self, i: i32) -> Result<(), NativeCallError> {
        debug!("native call: test2({i})");
        // SAFETY: plain integer argument.
        unsafe { (self.symbols.test2)(i) };
        Ok(())
    }

    fn add(&self, a: i32, b: i32) -> Result<i32, NativeCallError> {
        // SAFETY: plain integer arguments.
        let sum = unsafe { (self.symbols.add)(a, b) };
        debug!("native call: add({a}, {b}) = {sum}");
        Ok(sum)
    }

    fn do_cool_stuff(&self, transfer: &mut Transfer<'_>) -> Result<(), NativeCallError> {
        let before = transfer.id();
        // SAFETY: the record and its payload stay borrowed for the whole
        // call; the callee only sees them for its duration.
        unsafe { (self.symbols.do_cool_stuff)(transfer.as_mut_ptr()) };
        debug!(
            "native call: do_cool_stuff(id {before} -> {}, payload {:?})",
            transfer.id(),
            transfer.payload()
        );
        if !transfer.payload_intact() {
            transfer.restore_payload();
            warn!("do_cool_stuff replaced the payload pointer; restored");
            return Err(NativeCallError::InvalidPayload(
                "callee replaced the payload pointer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of [`run_diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsReport {
    pub engine: String,
    pub sum: i32,
    pub transfer_before: i32,
    pub transfer_after: i32,
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: test ok, test2(7) ok, add(3, 4) = {}, do_cool_stuff id {} -> {}",
            self.engine, self.sum, self.transfer_before, self.transfer_after
        )
    }
}

const DIAGNOSTIC_PAYLOAD: &str = "logik diagnostics";

/// Call each boundary function once.
pub fn run_diagnostics(engine: &dyn SimulationEngine) -> Result<DiagnosticsReport, NativeCallError> {
    engine.test()?;
    engine.test2(7)?;
    let sum = engine.add(3, 4)?;
    let payload = payload_cstring(DIAGNOSTIC_PAYLOAD)?;
    let mut transfer = Transfer::new(1, &payload);
    engine.do_cool_stuff(&mut transfer)?;
    Ok(DiagnosticsReport {
        engine: engine.name().to_string(),
        sum,
        transfer_before: 1,
        transfer_after: transfer.id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::abi::TransferStruct;

    #[test]
    fn test_builtin_engine_round_trip() {
        let engine = NativeEngine::builtin();
        assert_eq!(engine.name(), "builtin");
        assert!(engine.test().is_ok());
        assert!(engine.test2(-1).is_ok());
        assert_eq!(engine.add(20, 22), Ok(42));
    }

    #[test]
    fn test_diagnostics_report() {
        let report = run_diagnostics(&NativeEngine::builtin()).unwrap();
        assert_eq!(report.sum, 7);
        assert_eq!(report.transfer_after, 1 + DIAGNOSTIC_PAYLOAD.len() as i32);
        assert_eq!(
            report.to_string(),
            "builtin: test ok, test2(7) ok, add(3, 4) = 7, do_cool_stuff id 1 -> 18"
        );
    }

    #[test]
    fn test_payload_with_nul_is_rejected() {
        assert_eq!(
            payload_cstring("a\0b"),
            Err(NativeCallError::InvalidPayload("NUL byte at offset 1".to_string()))
        );
    }

    extern "C" fn swap_payload(stuff: *mut TransferStruct) {
        static OTHER: &std::ffi::CStr = c"swapped";
        // SAFETY: the engine passes a valid exclusive pointer.
        if let Some(stuff) = unsafe { stuff.as_mut() } {
            stuff.payload = OTHER.as_ptr();
        }
    }

    #[test]
    fn test_replaced_payload_pointer_is_reported_and_restored() {
        let mut engine = NativeEngine::builtin();
        engine.symbols.do_cool_stuff = swap_payload;
        let mut transfer = Transfer::new(0, c"mine");
        assert!(matches!(
            engine.do_cool_stuff(&mut transfer),
            Err(NativeCallError::InvalidPayload(_))
        ));
        assert!(transfer.payload_intact());
        assert_eq!(transfer.payload().to_str().unwrap(), "mine");
    }
}
