//! HTTP request model consumed by the curl converter.
//!
//! # Design
//! `HttpRequest` is plain data plus two body capabilities. The primary body is
//! a `Read` source that may be absent, empty or already partially consumed.
//! The optional regenerator (`GetBody`) hands out fresh readers over the same
//! bytes without disturbing the primary one, the way an in-memory body can be
//! replayed. Converting a request never performs network I/O; the caller owns
//! the request and any transport.
//!
//! The URL is an `http::Uri` because requests captured server-side carry only
//! an origin-form target (`/path?query`) with no scheme or authority. The host
//! and TLS flag are kept next to it so the absolute URL can be rebuilt.

use std::fmt;
use std::io::{self, Read};

use bytes::{Buf, Bytes};
use http::Uri;

/// A readable body source.
pub type BodyReader = Box<dyn Read + Send>;

/// Produces a fresh, independently readable copy of a request body.
pub type GetBody = Box<dyn Fn() -> io::Result<BodyReader> + Send + Sync>;

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Connect,
    Trace,
    /// Any extension method, kept verbatim.
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Other(method) => method,
        }
    }
}

impl From<&str> for HttpMethod {
    /// Methods are case-sensitive: `"get"` is an extension method, not `GET`.
    fn from(s: &str) -> Self {
        match s {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "OPTIONS" => HttpMethod::Options,
            "CONNECT" => HttpMethod::Connect,
            "TRACE" => HttpMethod::Trace,
            other => HttpMethod::Other(other.to_string()),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multi-value header map with case-insensitive keys.
///
/// The first spelling seen for a key is the one kept; values stay in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// Add `value` to the values of `key`, creating the key if needed.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1.push(value.into()),
            None => self.entries.push((key, vec![value.into()])),
        }
    }

    /// Replace every value of `key`. An empty `values` keeps the key with no
    /// values.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = values,
            None => self.entries.push((key, values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.position(key).map(|i| self.entries[i].1.as_slice())
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate keys and their values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.append(k, v);
        }
        headers
    }
}

/// An outgoing (or captured) HTTP request.
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Target URL. `None` makes the request unconvertible.
    pub url: Option<Uri>,
    /// Host used when the URL has no scheme.
    pub host: String,
    /// Whether the request travelled over TLS.
    pub tls: bool,
    pub headers: Headers,
    pub body: Option<BodyReader>,
    pub get_body: Option<GetBody>,
}

impl HttpRequest {
    /// Build a request for `url`, taking `host` from its authority.
    pub fn new(method: HttpMethod, url: Uri) -> Self {
        let host = url.authority().map(|a| a.to_string()).unwrap_or_default();
        Self {
            method,
            url: Some(url),
            host,
            tls: false,
            headers: Headers::new(),
            body: None,
            get_body: None,
        }
    }

    /// Build a request whose URL is unset.
    pub fn without_url(method: HttpMethod) -> Self {
        Self {
            method,
            url: None,
            host: String::new(),
            tls: false,
            headers: Headers::new(),
            body: None,
            get_body: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(key, value);
        self
    }

    /// Set an in-memory body. Installs a regenerator over the same bytes.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.set_body(body);
        self
    }

    /// In-place form of `with_body`.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        let body: Bytes = body.into();
        let replay = body.clone();
        self.body = Some(Box::new(body.reader()));
        self.get_body = Some(Box::new(move || -> io::Result<BodyReader> {
            Ok(Box::new(replay.clone().reader()))
        }));
    }

    /// Set a streaming body with no regenerator.
    pub fn with_body_reader(mut self, reader: impl Read + Send + 'static) -> Self {
        self.body = Some(Box::new(reader));
        self
    }

    pub fn with_get_body(
        mut self,
        get_body: impl Fn() -> io::Result<BodyReader> + Send + Sync + 'static,
    ) -> Self {
        self.get_body = Some(Box::new(get_body));
        self
    }

    /// Take the primary body source out of the request.
    pub fn take_body(&mut self) -> Option<BodyReader> {
        self.body.take()
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("host", &self.host)
            .field("tls", &self.tls)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| ".."))
            .field("get_body", &self.get_body.as_ref().map(|_| ".."))
            .finish()
    }
}
