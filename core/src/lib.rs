//! Turn HTTP requests into copy/paste-ready curl commands.
//!
//! # Overview
//! `CurlCommand::from_request` reads an `HttpRequest` (method, URL, headers,
//! body) and returns the argument tokens of an equivalent `curl` invocation.
//! Nothing is executed and no network I/O happens; the result is meant for
//! logs, bug reports and request-inspection tooling.
//!
//! # Design
//! - Conversion is stateless. The only mutation is restoring a drained body
//!   on the caller's request.
//! - Every value token is single-quoted by `shell_escape`, so the tokens
//!   joined by spaces are a valid POSIX shell line.
//! - Output is deterministic: headers are emitted in sorted key order.

pub mod command;
pub mod error;
pub mod escape;
pub mod request;

pub use command::{get_curl_command, CurlCommand};
pub use error::{BodyOrigin, CurlError};
pub use escape::{shell_escape, shell_escape_bytes};
pub use http::Uri;
pub use request::{BodyReader, GetBody, Headers, HttpMethod, HttpRequest};
