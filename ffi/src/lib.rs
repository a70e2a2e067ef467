//! C-ABI wrapper around `http2curl-core`.
//!
//! # Overview
//! Lets any language with a C FFI describe an HTTP request and get back the
//! equivalent curl command, without linking against Rust types directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary. The request handle owns boxed readers that
//!   are not `RefUnwindSafe`, hence `AssertUnwindSafe`; a panic leaves the
//!   handle in a state that is still safe to free.
//! - `curl_command_build` borrows the request mutably: a drained body is put
//!   back, so the same handle can be built again.
//! - The C caller owns all returned pointers and must call the matching
//!   `curl_*_free` / `curl_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use http2curl_core::{CurlCommand, HttpMethod, HttpRequest, Uri};

use types::*;

/// Borrow a C string as `&str`. Null or non-UTF-8 input yields `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Request lifecycle
// ---------------------------------------------------------------------------

/// Create a request for `method` and `url`.
///
/// A null `url` creates a request without a URL, which `curl_command_build`
/// rejects with `InvalidRequest`. Returns null if `method` is null, if either
/// string is not UTF-8, if `url` does not parse, or on panic.
/// The caller must free the returned pointer with `curl_request_free`.
#[unsafe(no_mangle)]
pub extern "C" fn curl_request_new(
    method: *const c_char,
    url: *const c_char,
) -> *mut FfiCurlRequest {
    catch_unwind(|| {
        let Some(method) = (unsafe { str_arg(method) }) else {
            return std::ptr::null_mut();
        };
        let method = HttpMethod::from(method);
        let inner = if url.is_null() {
            HttpRequest::without_url(method)
        } else {
            let parsed = unsafe { str_arg(url) }.and_then(|u| u.parse::<Uri>().ok());
            match parsed {
                Some(uri) => HttpRequest::new(method, uri),
                None => return std::ptr::null_mut(),
            }
        };
        Box::into_raw(Box::new(FfiCurlRequest { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a request created by `curl_request_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn curl_request_free(req: *mut FfiCurlRequest) {
    if !req.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(req) });
        }));
    }
}

/// Set the host used when the URL has no scheme.
///
/// Returns false if `req` or `host` is null or `host` is not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn curl_request_set_host(req: *mut FfiCurlRequest, host: *const c_char) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() {
            return false;
        }
        let Some(host) = (unsafe { str_arg(host) }) else {
            return false;
        };
        let req = unsafe { &mut *req };
        req.inner.host = host.to_string();
        true
    }))
    .unwrap_or(false)
}

/// Mark whether the request travelled over TLS.
#[unsafe(no_mangle)]
pub extern "C" fn curl_request_set_tls(req: *mut FfiCurlRequest, tls: bool) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() {
            return false;
        }
        unsafe { &mut *req }.inner.tls = tls;
        true
    }))
    .unwrap_or(false)
}

/// Append a header value. Repeated keys (case-insensitive) accumulate values.
///
/// Returns false if any argument is null or not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn curl_request_add_header(
    req: *mut FfiCurlRequest,
    key: *const c_char,
    value: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() {
            return false;
        }
        let (Some(key), Some(value)) = (unsafe { str_arg(key) }, unsafe { str_arg(value) }) else {
            return false;
        };
        unsafe { &mut *req }.inner.headers.append(key, value);
        true
    }))
    .unwrap_or(false)
}

/// Copy `len` bytes from `data` into the request body.
///
/// `data` may be null only when `len` is 0. Returns false if `req` is null.
#[unsafe(no_mangle)]
pub extern "C" fn curl_request_set_body(
    req: *mut FfiCurlRequest,
    data: *const u8,
    len: usize,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() || (data.is_null() && len > 0) {
            return false;
        }
        let bytes = if len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(data, len) }.to_vec()
        };
        unsafe { &mut *req }.inner.set_body(bytes);
        true
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Convert the request into a curl command.
///
/// Returns a result with `error_code = Ok` and the tokens on success. The
/// request stays usable and can be built again.
/// The caller must free the returned pointer with `curl_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn curl_command_build(req: *mut FfiCurlRequest) -> *mut FfiCurlResult {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() {
            return FfiCurlResult::null_arg("req");
        }
        let req = unsafe { &mut *req };
        match CurlCommand::from_request(&mut req.inner) {
            Ok(command) => FfiCurlResult::ok(command),
            Err(e) => FfiCurlResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiCurlResult::panic("panic in curl_command_build"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a result returned by `curl_command_build`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn curl_free_result(result: *mut FfiCurlResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        curl_free_string(result.error_message);
        curl_free_string(result.command_line);
        if !result.tokens.is_null() {
            let tokens = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    result.tokens,
                    result.tokens_len,
                ))
            };
            for &token in tokens.iter() {
                curl_free_string(token);
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn curl_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
