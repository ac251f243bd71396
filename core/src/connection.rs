//! Blocking request execution over pooled transport handles.
//!
//! # Design
//! `Connection` owns one `HandlePool`. Each `blocking_request` call takes a
//! handle for the duration of a single exchange and gives it back (reset)
//! when the call returns, on every exit path. The calling thread blocks for
//! the whole exchange; concurrency only comes from several threads sharing
//! one `Connection`.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::engine::{init_global, BodyCursor, Engine, HandleOption, TransportHandle};
use crate::error::{HttpError, HttpResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::pool::HandlePool;
use crate::ureq_engine::UreqEngine;

/// Options for a `Connection`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    /// Maximum number of idle handles kept for reuse.
    pub max_pool_size: usize,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions { max_pool_size: 10 }
    }
}

impl ConnectionOptions {
    /// Decode options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> HttpResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Synchronous HTTP client backed by a pool of transport handles.
pub struct Connection<E: Engine = UreqEngine> {
    options: ConnectionOptions,
    pool: HandlePool<E>,
}

impl Connection<UreqEngine> {
    pub fn new(options: ConnectionOptions) -> Self {
        Self::with_engine(UreqEngine::new(), options)
    }
}

impl<E: Engine> Connection<E> {
    /// Build a connection over a specific engine.
    ///
    /// Runs the engine's one-time global setup, then takes and returns one
    /// handle so a broken engine shows up in the logs right away and the
    /// first request finds a warm handle.
    pub fn with_engine(engine: E, options: ConnectionOptions) -> Self {
        init_global::<E>();
        let pool = HandlePool::new(engine, options.max_pool_size);
        if !pool.acquire().is_valid() {
            tracing::warn!("transport engine failed to produce a handle during warm-up");
        }
        Connection { options, pool }
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn pool(&self) -> &HandlePool<E> {
        &self.pool
    }

    /// Perform one request and wait for its response.
    ///
    /// `Err` means no response was produced. An HTTP error status is still
    /// `Ok`. There is no retry.
    pub fn blocking_request(&self, request: &HttpRequest) -> HttpResult<HttpResponse> {
        let mut guard = self.pool.acquire();
        let Some(handle) = guard.handle_mut() else {
            tracing::error!(url = %request.url, "could not initialize transport handle");
            return Err(HttpError::EngineUnavailable);
        };

        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        handle.set_option(HandleOption::Url(request.url.as_str().to_string()));

        let mut upload = None;
        match request.method {
            HttpMethod::Get => {}
            HttpMethod::Post => {
                handle.set_option(HandleOption::Post(request.body.clone()));
            }
            HttpMethod::Put => {
                handle.set_option(HandleOption::Upload {
                    size: request.body.len() as u64,
                });
                upload = Some(BodyCursor::new(&request.body));
            }
            HttpMethod::Delete => {
                handle.set_option(HandleOption::CustomRequest("DELETE".to_string()));
            }
        }

        if !request.headers.is_empty() {
            handle.set_option(HandleOption::Headers(request.headers.to_lines()));
        }

        let mut output = Vec::new();
        let source = upload.as_mut().map(|cursor| cursor as &mut dyn Read);
        if let Err(err) = handle.perform(source, &mut output) {
            tracing::error!(
                method = %request.method,
                url = %request.url,
                error = %err,
                "request failed"
            );
            return Err(err.into());
        }

        let mut response = HttpResponse::new();
        response.body = output;
        response.status = handle.response_code();
        response.headers = handle.response_headers();
        tracing::debug!(
            status = response.status,
            bytes = response.body.len(),
            "request completed"
        );
        Ok(response)
    }
}
