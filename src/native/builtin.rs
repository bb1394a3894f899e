//! In-process reference implementation of the simulation ABI.
//!
//! Same signatures as the library exports, so it goes through the exact
//! call path a loaded library does.

use std::ffi::CStr;

use log::{info, warn};

use crate::native::abi::{Symbols, TransferStruct};

extern "C" fn test() {
    info!("[builtin] test");
}

extern "C" fn test2(i: i32) {
    info!("[builtin] test2({i})");
}

extern "C" fn add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

/// Adds the payload's byte length to `id`. A null payload counts as empty.
extern "C" fn do_cool_stuff(stuff: *mut TransferStruct) {
    // SAFETY: the caller passes either null or a pointer to a live
    // TransferStruct it exclusively borrows for this call.
    let Some(stuff) = (unsafe { stuff.as_mut() }) else {
        warn!("[builtin] do_cool_stuff called with a null record");
        return;
    };
    let len = if stuff.payload.is_null() {
        0
    } else {
        // SAFETY: a non-null payload is a NUL-terminated string that
        // outlives the call.
        let payload = unsafe { CStr::from_ptr(stuff.payload) };
        info!(
            "[builtin] do_cool_stuff(id={}, payload={:?})",
            stuff.id,
            payload.to_string_lossy()
        );
        payload.to_bytes().len()
    };
    stuff.id = stuff.id.wrapping_add(i32::try_from(len).unwrap_or(i32::MAX));
}

pub fn symbols() -> Symbols {
    Symbols {
        test,
        test2,
        add,
        do_cool_stuff,
    }
}
