//! Error types for request-to-command conversion.
//!
//! # Design
//! Only two things can go wrong: the request has no URL to point curl at, or
//! draining its body hit an I/O fault. Escaping and token assembly are total,
//! so there is no third variant. `BodyReadError` records which body source
//! failed because the regenerated copy and the primary source are read at
//! different points of the conversion.

use std::fmt;
use std::io;

use thiserror::Error;

/// Which body source was being drained when a read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyOrigin {
    /// A fresh copy obtained from the request's body regenerator.
    Regenerated,
    /// The request's primary body reader.
    Primary,
}

impl fmt::Display for BodyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyOrigin::Regenerated => f.write_str("regenerated body"),
            BodyOrigin::Primary => f.write_str("primary body"),
        }
    }
}

/// Errors returned by `CurlCommand::from_request`.
#[derive(Debug, Error)]
pub enum CurlError {
    /// The request carries no URL.
    #[error("invalid request: URL is not set")]
    InvalidRequest,

    /// Reading the request body failed.
    #[error("failed to read {origin}: {cause}")]
    BodyReadError {
        origin: BodyOrigin,
        #[source]
        cause: io::Error,
    },
}

impl CurlError {
    pub(crate) fn body_read(origin: BodyOrigin, cause: io::Error) -> Self {
        CurlError::BodyReadError { origin, cause }
    }
}
