//! C ABI shared with the simulation library.
//!
//! Every symbol uses the platform C calling convention. Payload strings are
//! UTF-8 and NUL-terminated, borrowed from the caller for the duration of
//! one call.

use std::ffi::{CStr, c_char};

pub const SYM_TEST: &[u8] = b"test\0";
pub const SYM_TEST2: &[u8] = b"test2\0";
pub const SYM_ADD: &[u8] = b"add\0";
pub const SYM_DO_COOL_STUFF: &[u8] = b"do_cool_stuff\0";

/// Record passed by pointer to `do_cool_stuff`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TransferStruct {
    pub id: i32,
    pub payload: *const c_char,
}

pub type TestFn = unsafe extern "C" fn();
pub type Test2Fn = unsafe extern "C" fn(i: i32);
pub type AddFn = unsafe extern "C" fn(a: i32, b: i32) -> i32;
pub type DoCoolStuffFn = unsafe extern "C" fn(stuff: *mut TransferStruct);

/// Resolved entry points of one simulation library.
#[derive(Debug, Clone, Copy)]
pub struct Symbols {
    pub test: TestFn,
    pub test2: Test2Fn,
    pub add: AddFn,
    pub do_cool_stuff: DoCoolStuffFn,
}

/// A [`TransferStruct`] whose payload pointer borrows `'a`.
///
/// The callee may update `id`. The payload pointer has to come back
/// unchanged; see [`Transfer::payload_intact`].
#[derive(Debug)]
pub struct Transfer<'a> {
    raw: TransferStruct,
    payload: &'a CStr,
}

impl<'a> Transfer<'a> {
    pub fn new(id: i32, payload: &'a CStr) -> Self {
        Self {
            raw: TransferStruct {
                id,
                payload: payload.as_ptr(),
            },
            payload,
        }
    }

    pub fn id(&self) -> i32 {
        self.raw.id
    }

    pub fn payload(&self) -> &'a CStr {
        self.payload
    }

    /// Pointer handed across the boundary. Valid while `self` is borrowed.
    pub fn as_mut_ptr(&mut self) -> *mut TransferStruct {
        &mut self.raw
    }

    /// Whether the payload pointer still refers to the caller's string.
    pub fn payload_intact(&self) -> bool {
        std::ptr::eq(self.raw.payload, self.payload.as_ptr())
    }

    pub(crate) fn restore_payload(&mut self) {
        self.raw.payload = self.payload.as_ptr();
    }
}
