use core::ffi::c_char;
use std::cell::RefCell;

use crate::error::MarshalError;
use crate::ffi::types::{write_c_string, ForeignText};
use crate::marshal::default_marshaller;

// Per calling thread, like errno: another thread's call never clobbers it.
thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_last_error(msg: String) {
    log::debug!("last error: {msg}");
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(msg));
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

fn take_last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

/// Record the outcome of an export: errors are kept, success clears the slot.
fn record<T>(result: Result<T, MarshalError>) -> Option<T> {
    match result {
        Ok(value) => {
            clear_last_error();
            Some(value)
        }
        Err(err) => {
            set_last_error(err.to_string());
            None
        }
    }
}

/// Free a string returned by this library. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a string returned by this library that has not been
/// freed yet.
#[no_mangle]
pub unsafe extern "C" fn utf8_marshal_release(ptr: *mut c_char) {
    // SAFETY: forwarded from the caller.
    unsafe { default_marshaller().release(ForeignText::from_raw(ptr)) }
}

/// Duplicate a foreign string into a buffer owned by this library.
///
/// Null in gives null out. On failure returns null and records an error for
/// `utf8_marshal_last_error`; success clears it. Free the result with
/// `utf8_marshal_release`.
///
/// # Safety
///
/// `ptr` must be null or a readable NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn utf8_marshal_copy(ptr: *const c_char) -> *mut c_char {
    let marshaller = default_marshaller();
    // SAFETY: forwarded from the caller.
    let copied = unsafe { marshaller.decode(ptr) }.and_then(|text| marshaller.encode(text.as_deref()));
    match record(copied) {
        Some(text) => text.into_raw(),
        None => core::ptr::null_mut(),
    }
}

/// Byte length of a foreign string, terminator excluded. Null gives 0.
///
/// # Safety
///
/// `ptr` must be null or a readable NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn utf8_marshal_byte_len(ptr: *const c_char) -> usize {
    // SAFETY: forwarded from the caller.
    record(unsafe { default_marshaller().byte_len(ptr) })
        .flatten()
        .unwrap_or(0)
}

/// Drain the calling thread's last error message into `out`.
/// Returns the number of bytes written (excluding the NUL terminator).
///
/// # Safety
///
/// `out` must be null or writable for `cap` bytes.
#[no_mangle]
pub unsafe extern "C" fn utf8_marshal_last_error(out: *mut c_char, cap: usize) -> usize {
    if out.is_null() || cap == 0 {
        return 0;
    }
    let msg = take_last_error().unwrap_or_default();
    // SAFETY: forwarded from the caller.
    unsafe { write_c_string(out, cap, &msg) }
}
