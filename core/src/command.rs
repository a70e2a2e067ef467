//! Request-to-curl conversion.
//!
//! # Design
//! `CurlCommand::from_request` is stateless: it reads the request, drains its
//! body once and assembles tokens in a fixed order
//! (`curl [-k] -X <method> [-d <body>] [-H <header>]... <url> --compressed`).
//! Every value token is single-quoted, so joining the tokens with spaces gives
//! a line that can be pasted into a POSIX shell as-is.
//!
//! Tokens are byte strings. A body need not be UTF-8, and the command must
//! hand curl the exact bytes, so nothing is decoded on the way through.
//!
//! Draining a primary body that has no usable regenerator would leave the
//! caller's request empty, so the drained bytes are put back as a fresh
//! reader. That is why conversion takes `&mut HttpRequest`.

use std::fmt;
use std::io::Read;

use bytes::{Buf, Bytes};
use http::Uri;
use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{BodyOrigin, CurlError};
use crate::escape::{shell_escape, shell_escape_bytes};
use crate::request::HttpRequest;

/// An ordered list of shell-ready curl arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurlCommand(Vec<Vec<u8>>);

impl CurlCommand {
    /// Convert `req` into a curl invocation.
    ///
    /// Fails with `InvalidRequest` if the URL is unset and with
    /// `BodyReadError` if draining the body fails. On success the request's
    /// body still reads back the same bytes.
    pub fn from_request(req: &mut HttpRequest) -> Result<Self, CurlError> {
        let url = req.url.as_ref().ok_or(CurlError::InvalidRequest)?;
        let (scheme, target) = effective_url(url, &req.host, req.tls);

        let mut command = CurlCommand::default();
        command.push("curl");

        if scheme == "https" {
            command.push("-k");
        }

        command.push("-X");
        command.push(shell_escape(req.method.as_str()));

        let body = read_body(req)?;
        if !body.is_empty() {
            command.push("-d");
            command.push(shell_escape_bytes(&body));
        }

        // curl recomputes Content-Length from -d.
        let mut headers: Vec<(&str, &[String])> = req
            .headers
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case("Content-Length"))
            .collect();
        headers.sort_by(|a, b| a.0.cmp(b.0));

        for (key, values) in headers {
            command.push("-H");
            command.push(shell_escape(&format!("{key}: {}", values.join(" "))));
        }

        command.push(shell_escape(&target));
        command.push("--compressed");

        trace!(command = %command, "built curl command");
        Ok(command)
    }

    fn push(&mut self, token: impl Into<Vec<u8>>) {
        self.0.push(token.into());
    }

    /// The raw tokens.
    pub fn tokens(&self) -> &[Vec<u8>] {
        &self.0
    }

    pub fn into_tokens(self) -> Vec<Vec<u8>> {
        self.0
    }

    /// The tokens as text, or `None` if any of them is not UTF-8.
    pub fn to_str_tokens(&self) -> Option<Vec<&str>> {
        self.0.iter().map(|t| std::str::from_utf8(t).ok()).collect()
    }

    /// The exact command line: tokens joined by single spaces.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.join(&b' ')
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Convert `req` into a curl invocation. Same as `CurlCommand::from_request`.
pub fn get_curl_command(req: &mut HttpRequest) -> Result<CurlCommand, CurlError> {
    CurlCommand::from_request(req)
}

impl fmt::Display for CurlCommand {
    /// The command line as text. Bytes that are not UTF-8 show as U+FFFD;
    /// use `to_bytes` for the exact line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

impl IntoIterator for CurlCommand {
    type Item = Vec<u8>;
    type IntoIter = std::vec::IntoIter<Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CurlCommand {
    type Item = &'a Vec<u8>;
    type IntoIter = std::slice::Iter<'a, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A token on the wire: a string when it is UTF-8, raw bytes otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireToken {
    Text(String),
    Raw(Vec<u8>),
}

impl Serialize for CurlCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for token in &self.0 {
            match std::str::from_utf8(token) {
                Ok(text) => seq.serialize_element(text)?,
                Err(_) => seq.serialize_element(token)?,
            }
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for CurlCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tokens = Vec::<WireToken>::deserialize(deserializer)?;
        Ok(CurlCommand(
            tokens
                .into_iter()
                .map(|t| match t {
                    WireToken::Text(text) => text.into_bytes(),
                    WireToken::Raw(raw) => raw,
                })
                .collect(),
        ))
    }
}

/// Resolve the scheme and the URL string curl should target.
///
/// Without an explicit scheme the URL is rebuilt from host and path only; the
/// query string is not carried over.
fn effective_url(url: &Uri, host: &str, tls: bool) -> (String, String) {
    match url.scheme_str() {
        Some(scheme) => (scheme.to_string(), url.to_string()),
        None => {
            let scheme = if tls { "https" } else { "http" };
            (scheme.to_string(), format!("{scheme}://{host}{}", url.path()))
        }
    }
}

/// Drain the request body, preferring a regenerated copy.
///
/// Falls back to the primary reader when there is no regenerator, when it
/// cannot produce a reader, or when the copy is empty. A drained primary
/// reader is replaced by a fresh one over the same bytes.
fn read_body(req: &mut HttpRequest) -> Result<Bytes, CurlError> {
    let mut buf = Vec::new();

    if let Some(get_body) = &req.get_body {
        match get_body() {
            Ok(mut copy) => {
                copy.read_to_end(&mut buf)
                    .map_err(|e| CurlError::body_read(BodyOrigin::Regenerated, e))?;
            }
            Err(err) => warn!(error = %err, "body regenerator failed, reading primary body"),
        }
    }

    if !buf.is_empty() {
        return Ok(Bytes::from(buf));
    }

    let Some(body) = req.body.as_mut() else {
        return Ok(Bytes::new());
    };
    body.read_to_end(&mut buf)
        .map_err(|e| CurlError::body_read(BodyOrigin::Primary, e))?;

    let bytes = Bytes::from(buf);
    req.body = Some(Box::new(bytes.clone().reader()));
    debug!(len = bytes.len(), "replaced drained request body");
    Ok(bytes)
}
