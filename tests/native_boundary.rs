//! Exercises the C ABI boundary through the public engine API, using the
//! in-process engine so no shared library is needed.

use std::ffi::CString;

use logik::EngineKind;
use logik::native::{
    NativeCallError, NativeEngine, SimulationEngine, Transfer, build_engine, payload_cstring,
    resolve_library_path, run_diagnostics,
};

#[test]
fn test_add_across_the_boundary() {
    let engine = NativeEngine::builtin();
    assert_eq!(engine.add(3, 4), Ok(7));
    assert_eq!(engine.add(0, 0), Ok(0));
    assert_eq!(engine.add(-10, 4), Ok(-6));
    assert_eq!(engine.add(i32::MAX, 1), Ok(i32::MIN));
}

#[test]
fn test_void_calls_succeed() {
    let engine = NativeEngine::builtin();
    assert_eq!(engine.test(), Ok(()));
    assert_eq!(engine.test2(-1), Ok(()));
}

#[test]
fn test_transfer_record_is_updated_in_place() {
    let engine = NativeEngine::builtin();
    let payload = payload_cstring("hello").unwrap();
    let mut transfer = Transfer::new(10, &payload);
    engine.do_cool_stuff(&mut transfer).unwrap();
    assert_eq!(transfer.id(), 15);
    assert_eq!(transfer.payload().to_str(), Ok("hello"));

    // The record can go through the boundary again
    engine.do_cool_stuff(&mut transfer).unwrap();
    assert_eq!(transfer.id(), 20);
}

#[test]
fn test_empty_payload_leaves_id() {
    let engine = NativeEngine::builtin();
    let payload = CString::default();
    let mut transfer = Transfer::new(-3, &payload);
    engine.do_cool_stuff(&mut transfer).unwrap();
    assert_eq!(transfer.id(), -3);
}

#[test]
fn test_interior_nul_payload_is_rejected() {
    assert!(matches!(
        payload_cstring("bad\0payload"),
        Err(NativeCallError::InvalidPayload(_))
    ));
}

#[test]
fn test_missing_library_fails_to_load() {
    let missing = std::env::temp_dir().join("logik-no-such-dir").join("logik_simulation");
    let result = build_engine(EngineKind::Native, &missing.display().to_string());
    match result {
        Err(NativeCallError::LoadFailed { path, .. }) => {
            assert!(path.contains("logik_simulation"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("loaded a library that does not exist"),
    }
}

#[test]
fn test_library_name_gets_platform_affixes() {
    let path = resolve_library_path("native/logik_simulation");
    let file = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file.contains("logik_simulation"));
    assert_ne!(file, "logik_simulation");
}

#[test]
fn test_diagnostics_report() {
    let engine = build_engine(EngineKind::Builtin, "unused").unwrap();
    let report = run_diagnostics(engine.as_ref()).unwrap();
    assert_eq!(report.sum, 7);
    assert_eq!(report.transfer_before, 1);
    assert_eq!(report.transfer_after, 18);
    assert!(report.to_string().starts_with("builtin: test ok"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_foreign_library_is_rejected_at_startup() {
    // An explicit file name is used as given, so this loads the system libc
    match build_engine(EngineKind::Native, "libc.so.6") {
        Err(NativeCallError::MissingSymbol { symbol, .. }) => assert_eq!(symbol, "test"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("libc exported the simulation boundary"),
    }
}
