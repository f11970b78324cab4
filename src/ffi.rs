//! FFI bindings for Pulse Score
//!
//! This module provides C-compatible functions for calling the engine from the
//! mobile host. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `pulse_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{summary_from_json, ScoreEngine};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score a JSON array of log records and return summary JSON.
///
/// # Safety
/// - `json` and `reference_date` must be valid null-terminated C strings.
/// - `reference_date` is formatted `YYYY-MM-DD`.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_summary_from_json(
    json: *const c_char,
    reference_date: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let date_str = match cstr_to_string(reference_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid reference_date string pointer");
            return ptr::null_mut();
        }
    };

    match summary_from_json(json_str, date_str) {
        Ok(summary) => string_to_cstr(&summary),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to a ScoreEngine
pub struct PulseEngineHandle {
    engine: ScoreEngine,
}

/// Create a new engine with the default goals.
///
/// # Safety
/// - Returns a pointer to a newly allocated engine.
/// - Must be freed with `pulse_engine_free`.
#[no_mangle]
pub unsafe extern "C" fn pulse_engine_new() -> *mut PulseEngineHandle {
    clear_last_error();

    let handle = Box::new(PulseEngineHandle {
        engine: ScoreEngine::new(),
    });
    Box::into_raw(handle)
}

/// Create a new engine from a JSON goals document.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - Must be freed with `pulse_engine_free`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_engine_new_with_config(
    config_json: *const c_char,
) -> *mut PulseEngineHandle {
    clear_last_error();

    let config_str = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        }
    };

    match ScoreEngine::from_config_json(&config_str) {
        Ok(engine) => Box::into_raw(Box::new(PulseEngineHandle { engine })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `pulse_engine_new*`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_engine_free(engine: *mut PulseEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Score a JSON array of log records and return report JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `pulse_engine_new*`.
/// - `json`, `reference_date`, and `subject_id` must be valid null-terminated C strings.
/// - `member_id` may be NULL to score every entry.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_engine_process(
    engine: *const PulseEngineHandle,
    json: *const c_char,
    reference_date: *const c_char,
    subject_id: *const c_char,
    member_id: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let date_str = match cstr_to_string(reference_date) {
        Some(s) => s,
        None => {
            set_last_error("Invalid reference_date string pointer");
            return ptr::null_mut();
        }
    };

    let subject_str = match cstr_to_string(subject_id) {
        Some(s) => s,
        None => {
            set_last_error("Invalid subject_id string pointer");
            return ptr::null_mut();
        }
    };

    let member = cstr_to_string(member_id);

    match handle
        .engine
        .process_json(&json_str, &date_str, &subject_str, member.as_deref())
    {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Pulse Score functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Pulse Score function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Pulse Score call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn pulse_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn pulse_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
