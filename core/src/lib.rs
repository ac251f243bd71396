//! Minimal blocking HTTP client with pooled transport handles.
//!
//! # Overview
//! A caller builds an `HttpRequest` and hands it to
//! `Connection::blocking_request`, which borrows a transport handle from a
//! bounded pool, performs one synchronous exchange, and returns an
//! `HttpResponse`. Handles are reset and returned to the pool on every exit
//! path, so their construction cost is paid once across many requests.
//!
//! # Design
//! - `HandlePool` is a mutex-guarded LIFO freelist capped at
//!   `max_pool_size`. It never blocks: an empty pool builds a new handle.
//! - `PooledHandle` is the scoped guard; dropping it releases the handle
//!   exactly once.
//! - The engine boundary (`Engine`, `TransportHandle`) is a trait so the
//!   executor can be driven by the `ureq` engine in production and by a
//!   scripted engine in tests.
//! - There is no retry, timeout or response size cap in this layer.

pub mod connection;
pub mod engine;
pub mod error;
pub mod headers;
pub mod http;
pub mod pool;
pub mod ureq_engine;

#[cfg(test)]
mod stub;

pub use connection::{Connection, ConnectionOptions};
pub use engine::{BodyCursor, Engine, HandleOption, TransportError, TransportHandle};
pub use error::{HttpError, HttpResult};
pub use headers::HttpHeaders;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Url};
pub use pool::{HandlePool, PooledHandle};
pub use ureq_engine::{UreqEngine, UreqHandle};
