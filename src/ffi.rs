//! FFI (Foreign Function Interface) layer for C integration
//!
//! This module exposes [`Sanitizer`] to C callers through an opaque handle.
//!
//! # FFI Boundary Contract
//!
//! ## String Representation
//!
//! **All strings use UTF-8 bytes + length representation (NOT NUL-terminated C strings)**
//!
//! - Pointer field: `*const u8` / `*mut u8` (points to UTF-8 bytes)
//! - Length field: `usize` with `_len` suffix (byte count, no terminator)
//!
//! C code must use the length field and never `strlen()` on these pointers.
//!
//! ## Memory Management
//!
//! - Rust allocates all output memory using `Box<[u8]>`
//! - C must call `html_sanitizer_result_free()` exactly once per result
//! - C must call `html_sanitizer_free()` exactly once per handle
//! - Never pass these pointers to C `free()`
//!
//! ```rust
//! use html_sanitizer::ffi::*;
//! use std::ptr;
//!
//! let whitelist = b"b|i";
//! let handle = unsafe { html_sanitizer_new(whitelist.as_ptr(), whitelist.len()) };
//! assert!(!handle.is_null());
//!
//! let html = b"<b onclick=\"x\">ok</b><script>no</script>";
//! let mut result = SanitizeResult::default();
//! unsafe {
//!     html_sanitizer_sanitize(handle, html.as_ptr(), html.len(), ptr::null(), 0, &mut result);
//! }
//! assert_eq!(result.error_code, ERROR_SUCCESS);
//! let output = unsafe { std::slice::from_raw_parts(result.output, result.output_len) };
//! assert_eq!(output, b"<b>ok</b>");
//!
//! unsafe {
//!     html_sanitizer_result_free(&mut result);
//!     html_sanitizer_free(handle);
//! }
//! ```
//!
//! ## Error Handling Contract
//!
//! **Success:** `error_code = 0`, `error_message = NULL`, `error_len = 0`,
//! `output` holds the sanitized markup (possibly zero-length).
//!
//! **Error:** `error_code != 0`, `error_message` points to a UTF-8 description,
//! `output` is NULL.
//!
//! Constructors and sanitize calls run inside `catch_unwind`; a Rust panic
//! never unwinds into C.
//!
//! ## Thread Safety
//!
//! A handle is NOT thread-safe. Mutating the allow-list while a sanitize call
//! on the same handle is running on another thread is undefined behavior.
//! Separate handles can be used concurrently.

use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

use crate::allow_list::AllowList;
use crate::error::SanitizeError;
use crate::sanitizer::Sanitizer;

// ============================================================================
// Error Code Constants
// ============================================================================

/// Success - no error occurred
pub const ERROR_SUCCESS: u32 = 0;

/// Character encoding error (invalid bytes, unsupported charset)
pub const ERROR_ENCODING: u32 = 2;

/// Invalid input data (NULL pointers, non-UTF-8 arguments)
pub const ERROR_INVALID_INPUT: u32 = 5;

/// Internal error (unexpected condition, panic caught)
pub const ERROR_INTERNAL: u32 = 99;

// ============================================================================
// FFI Data Structures
// ============================================================================

/// Sanitization result returned from Rust to C
///
/// # State Invariants
///
/// **Success State (error_code == 0):**
/// - `output` points to `output_len` bytes of UTF-8 markup
/// - `error_message` is NULL, `error_len` is 0
///
/// **Error State (error_code != 0):**
/// - `output` is NULL, `output_len` is 0
/// - `error_message` points to `error_len` bytes of UTF-8 text
#[repr(C)]
pub struct SanitizeResult {
    /// Sanitized markup (UTF-8 bytes, NOT NUL-terminated)
    pub output: *mut u8,

    /// Length of output in bytes
    pub output_len: usize,

    /// Error code: 0=success, non-zero=error (see ERROR_* constants)
    pub error_code: u32,

    /// Error message (UTF-8 bytes, NULL on success)
    pub error_message: *mut u8,

    /// Length of error message in bytes
    pub error_len: usize,
}

impl Default for SanitizeResult {
    fn default() -> Self {
        Self {
            output: ptr::null_mut(),
            output_len: 0,
            error_code: ERROR_SUCCESS,
            error_message: ptr::null_mut(),
            error_len: 0,
        }
    }
}

/// Opaque handle to a Rust sanitizer instance
///
/// # Lifecycle
///
/// 1. Create: `html_sanitizer_new()`
/// 2. Configure: `html_sanitizer_allow()` / `html_sanitizer_clear()` (optional)
/// 3. Use: `html_sanitizer_sanitize()` any number of times
/// 4. Destroy: `html_sanitizer_free()`
pub struct HtmlSanitizerHandle {
    sanitizer: Sanitizer,
}

fn reset_result(result: &mut SanitizeResult) {
    *result = SanitizeResult::default();
}

fn set_error_result(result: &mut SanitizeResult, error_code: u32, error_message: String) {
    let error_bytes = error_message.into_bytes().into_boxed_slice();
    result.error_code = error_code;
    result.error_len = error_bytes.len();
    result.error_message = Box::into_raw(error_bytes) as *mut u8;
}

fn set_success_result(result: &mut SanitizeResult, output: String) {
    let output_bytes = output.into_bytes().into_boxed_slice();
    result.output_len = output_bytes.len();
    result.output = Box::into_raw(output_bytes) as *mut u8;
    result.error_code = ERROR_SUCCESS;
}

fn required_bytes<'a>(ptr: *const u8, len: usize, name: &str) -> Result<&'a [u8], SanitizeError> {
    if len == 0 {
        return Ok(&[]);
    }

    if ptr.is_null() {
        return Err(SanitizeError::InvalidInput(format!(
            "{name} pointer is NULL"
        )));
    }

    // SAFETY: Pointer was validated as non-NULL above; caller guarantees `len`
    // bytes are valid and readable for the duration of this call.
    Ok(unsafe { slice::from_raw_parts(ptr, len) })
}

fn required_utf8<'a>(ptr: *const u8, len: usize, name: &str) -> Result<&'a str, SanitizeError> {
    let bytes = required_bytes(ptr, len, name)?;
    std::str::from_utf8(bytes)
        .map_err(|e| SanitizeError::InvalidInput(format!("{name} is not valid UTF-8: {e}")))
}

fn optional_utf8<'a>(
    ptr: *const u8,
    len: usize,
    name: &str,
) -> Result<Option<&'a str>, SanitizeError> {
    if len == 0 {
        return Ok(None);
    }
    required_utf8(ptr, len, name).map(Some)
}

fn free_buffer(ptr_field: &mut *mut u8, len_field: &mut usize) {
    if (*ptr_field).is_null() {
        return;
    }

    let raw = ptr::slice_from_raw_parts_mut(*ptr_field, *len_field);
    // SAFETY: `raw` was allocated by `Box<[u8]>` via `Box::into_raw`.
    let _ = unsafe { Box::from_raw(raw) };
    *ptr_field = ptr::null_mut();
    *len_field = 0;
}

// ============================================================================
// FFI Functions
// ============================================================================

/// Create a new sanitizer instance
///
/// `whitelist` is an optional pipe-delimited list of element names
/// (e.g. `"b|i|p"`); pass NULL/0 for an empty allow-list.
///
/// # Returns
///
/// - Non-NULL handle on success
/// - NULL if the whitelist is not valid UTF-8, the pointer is NULL with a
///   non-zero length, or allocation panicked
///
/// # Safety
///
/// `whitelist` must point to `whitelist_len` readable bytes when
/// `whitelist_len > 0`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn html_sanitizer_new(
    whitelist: *const u8,
    whitelist_len: usize,
) -> *mut HtmlSanitizerHandle {
    let result = panic::catch_unwind(|| -> Result<*mut HtmlSanitizerHandle, SanitizeError> {
        let allow_list = optional_utf8(whitelist, whitelist_len, "whitelist")?
            .map(AllowList::parse_delimited)
            .unwrap_or_default();
        let handle = HtmlSanitizerHandle {
            sanitizer: Sanitizer::with_allow_list(allow_list),
        };
        Ok(Box::into_raw(Box::new(handle)))
    });

    match result {
        Ok(Ok(handle)) => handle,
        _ => ptr::null_mut(),
    }
}

/// Add an element name to a handle's allow-list
///
/// # Returns
///
/// `ERROR_SUCCESS`, or `ERROR_INVALID_INPUT` for a NULL handle, a NULL name
/// pointer or a non-UTF-8 name.
///
/// # Safety
///
/// `handle` must be NULL or a live handle from `html_sanitizer_new()` not in
/// use on another thread; `name` must point to `name_len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn html_sanitizer_allow(
    handle: *mut HtmlSanitizerHandle,
    name: *const u8,
    name_len: usize,
) -> u32 {
    if handle.is_null() {
        return ERROR_INVALID_INPUT;
    }

    // SAFETY: `handle` was validated as non-NULL above and the caller
    // guarantees exclusive access for the duration of this call.
    let handle_ref = unsafe { &mut *handle };

    let result = panic::catch_unwind(AssertUnwindSafe(|| -> Result<(), SanitizeError> {
        let name = required_utf8(name, name_len, "name")?;
        handle_ref.sanitizer.allow_list_mut().insert(name);
        Ok(())
    }));

    match result {
        Ok(Ok(())) => ERROR_SUCCESS,
        Ok(Err(e)) => e.code(),
        Err(_) => ERROR_INTERNAL,
    }
}

/// Remove every name from a handle's allow-list
///
/// # Safety
///
/// `handle` must be NULL or a live handle not in use on another thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn html_sanitizer_clear(handle: *mut HtmlSanitizerHandle) -> u32 {
    if handle.is_null() {
        return ERROR_INVALID_INPUT;
    }

    // SAFETY: `handle` was validated as non-NULL above.
    let handle_ref = unsafe { &mut *handle };
    handle_ref.sanitizer.allow_list_mut().clear();
    ERROR_SUCCESS
}

/// Sanitize HTML bytes
///
/// # Parameters
///
/// - `handle`: live handle from `html_sanitizer_new()`
/// - `html` / `html_len`: input bytes; NULL is allowed only with length 0,
///   which produces an empty output
/// - `content_type` / `content_type_len`: optional Content-Type header value
///   used for charset detection; NULL/0 when unknown
/// - `result`: populated on return; free with `html_sanitizer_result_free()`
///
/// # Error Codes
///
/// - `ERROR_INVALID_INPUT` (5): NULL handle/pointer, non-UTF-8 content type
/// - `ERROR_ENCODING` (2): input bytes invalid for the resolved charset
/// - `ERROR_INTERNAL` (99): panic caught
///
/// # Safety
///
/// All non-NULL pointers must be valid for their stated lengths. The handle
/// must not be used concurrently from another thread. A NULL `result` makes
/// this call a no-op.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn html_sanitizer_sanitize(
    handle: *const HtmlSanitizerHandle,
    html: *const u8,
    html_len: usize,
    content_type: *const u8,
    content_type_len: usize,
    result: *mut SanitizeResult,
) {
    // Validate result pointer first so we can report errors.
    if result.is_null() {
        return;
    }

    // SAFETY: `result` was validated as non-NULL above.
    let result_ref = unsafe { &mut *result };
    reset_result(result_ref);

    let panic_result = panic::catch_unwind(AssertUnwindSafe(|| -> Result<String, SanitizeError> {
        if handle.is_null() {
            return Err(SanitizeError::InvalidInput(
                "Sanitizer handle pointer is NULL".to_string(),
            ));
        }
        // SAFETY: `handle` is non-NULL and the caller guarantees it is live.
        let handle_ref = unsafe { &*handle };
        let html_slice = required_bytes(html, html_len, "HTML")?;
        let content_type_str = optional_utf8(content_type, content_type_len, "content_type")?;
        handle_ref
            .sanitizer
            .sanitize_bytes(html_slice, content_type_str)
    }));

    match panic_result {
        Ok(Ok(output)) => set_success_result(result_ref, output),
        Ok(Err(e)) => set_error_result(result_ref, e.code(), e.to_string()),
        Err(_) => set_error_result(
            result_ref,
            ERROR_INTERNAL,
            "Internal panic during sanitization".to_string(),
        ),
    }
}

/// Free memory held by a result
///
/// Safe to call more than once: pointers are set to NULL after the first call.
///
/// # Safety
///
/// `result` must be NULL or point to a result populated by
/// `html_sanitizer_sanitize()`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn html_sanitizer_result_free(result: *mut SanitizeResult) {
    if result.is_null() {
        return;
    }

    // SAFETY: `result` was validated as non-NULL above.
    let result_ref = unsafe { &mut *result };
    free_buffer(&mut result_ref.output, &mut result_ref.output_len);
    free_buffer(&mut result_ref.error_message, &mut result_ref.error_len);
    result_ref.error_code = ERROR_SUCCESS;
}

/// Destroy a sanitizer instance
///
/// # Safety
///
/// `handle` must be NULL or a handle from `html_sanitizer_new()` that has not
/// been freed and is not in use.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn html_sanitizer_free(handle: *mut HtmlSanitizerHandle) {
    if handle.is_null() {
        return;
    }

    // SAFETY: `handle` was validated as non-NULL above and was originally
    // created by `Box::into_raw` in `html_sanitizer_new`.
    unsafe { drop(Box::from_raw(handle)) };
}
