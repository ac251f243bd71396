//! Error types for the pooled HTTP client.
//!
//! # Design
//! Every `Err` returned from `Connection::blocking_request` means "no
//! response": there is never a partial `HttpResponse`. HTTP-level error
//! statuses (404, 500, ...) are not errors here; they come back as a
//! normal response with the status set.

use thiserror::Error;

use crate::engine::TransportError;

/// Result alias used across the crate.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The transport engine could not construct a handle.
    #[error("transport engine unavailable: could not initialize a handle")]
    EngineUnavailable,

    /// A method value outside GET/POST/PUT/DELETE. Only produced while
    /// converting untyped input into `HttpMethod`; a built request can
    /// never carry one.
    #[error("invalid request method: {0}")]
    InvalidMethod(String),

    /// The exchange did not complete (connect, DNS, TLS, protocol...).
    #[error("request failed: {0}")]
    Transport(#[from] TransportError),

    /// `ConnectionOptions` could not be decoded.
    #[error("invalid connection options: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
