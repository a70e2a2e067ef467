//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! The request is an opaque handle because its body sources are Rust trait
//! objects. The result is a flat C struct: an error code, a message, the token
//! array and the joined command line. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use http2curl_core::{CurlCommand, CurlError};

/// Opaque handle to an `HttpRequest`. C callers receive a pointer to this
/// and pass it back into every `curl_request_*` function.
pub struct FfiCurlRequest {
    pub(crate) inner: http2curl_core::HttpRequest,
}

/// Error codes returned in `FfiCurlResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidRequest = 1,
    BodyRead = 2,
    Panic = 3,
    NullArg = 4,
}

/// Result envelope for `curl_command_build`.
///
/// On success `error_code` is `Ok`, `error_message` is null, `tokens` holds
/// `tokens_len` C strings and `command_line` is the space-joined command.
/// On failure `error_message` is set and the token fields are null/zero.
#[repr(C)]
pub struct FfiCurlResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub tokens: *mut *mut c_char,
    pub tokens_len: usize,
    pub command_line: *mut c_char,
}

/// Move `s` into a heap C string. The bytes are copied as is, so they need
/// not be UTF-8. Interior NULs cannot cross the boundary and are dropped.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s.into())
        .unwrap_or_else(|e| {
            let mut bytes = e.into_vec();
            bytes.retain(|&b| b != 0);
            CString::new(bytes).unwrap_or_default()
        })
        .into_raw()
}

impl FfiCurlResult {
    fn error(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiCurlResult {
            error_code,
            error_message: c_string(msg),
            tokens: std::ptr::null_mut(),
            tokens_len: 0,
            command_line: std::ptr::null_mut(),
        }))
    }

    /// Build a success result from a converted command.
    pub(crate) fn ok(command: CurlCommand) -> *mut Self {
        let command_line = c_string(command.to_bytes());
        let tokens: Box<[*mut c_char]> = command.into_iter().map(c_string).collect();
        let tokens_len = tokens.len();

        Box::into_raw(Box::new(FfiCurlResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            tokens: Box::into_raw(tokens) as *mut *mut c_char,
            tokens_len,
            command_line,
        }))
    }

    /// Build an error result from a `CurlError`.
    pub(crate) fn from_error(err: CurlError) -> *mut Self {
        let code = match err {
            CurlError::InvalidRequest => FfiErrorCode::InvalidRequest,
            CurlError::BodyReadError { .. } => FfiErrorCode::BodyRead,
        };
        Self::error(code, err.to_string())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg.to_string())
    }
}
