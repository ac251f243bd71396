//! Boundary to the transport engine that performs the actual exchange.
//!
//! # Design
//! The pool and executor only sequence calls against this capability set:
//! create, reset, configure, perform, read back status/headers. Dispose is
//! `Drop`. Body streaming works through `std::io` traits: the upload body is
//! offered as a `Read` source and the response body is pushed into a `Write`
//! sink, one chunk per call.

use std::any::TypeId;
use std::cmp;
use std::collections::HashSet;
use std::io::{self, Read, Write};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use thiserror::Error;

use crate::headers::HttpHeaders;

/// Factory for transport handles.
pub trait Engine: Send + Sync + 'static {
    type Handle: TransportHandle;

    /// Construct a fresh handle. `None` means the engine itself failed.
    fn create(&self) -> Option<Self::Handle>;

    /// Process-wide setup, run once through [`init_global`].
    fn global_init()
    where
        Self: Sized,
    {
    }
}

/// One stateful engine session. Exclusively owned by whoever holds it.
pub trait TransportHandle: Send {
    /// Drop every per-request option, returning to neutral configuration.
    fn reset(&mut self);

    fn set_option(&mut self, option: HandleOption);

    /// Run the configured exchange. `upload` is read from only when the
    /// handle was configured with [`HandleOption::Upload`].
    fn perform(
        &mut self,
        upload: Option<&mut dyn Read>,
        sink: &mut dyn Write,
    ) -> Result<(), TransportError>;

    /// Status of the last completed exchange.
    fn response_code(&self) -> i32;

    fn response_headers(&self) -> HttpHeaders {
        HttpHeaders::new()
    }
}

/// A single per-request setting applied to a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOption {
    Url(String),
    /// POST with this exact payload.
    Post(Vec<u8>),
    /// PUT whose body is streamed from the upload reader, `size` bytes long.
    Upload { size: u64 },
    /// Override the verb.
    CustomRequest(String),
    /// Complete header list as `name: value` lines.
    Headers(Vec<String>),
}

/// Failure reported by the engine, carrying its diagnostic text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        TransportError::new(err.to_string())
    }
}

/// Upload source over a borrowed body.
///
/// Every read hands out exactly `min(buf.len(), remaining)` bytes, in order,
/// and advances the cursor by that amount.
#[derive(Debug)]
pub struct BodyCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BodyCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
}

impl Read for BodyCursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let actual = cmp::min(buf.len(), self.remaining());
        buf[..actual].copy_from_slice(&self.data[self.offset..self.offset + actual]);
        self.offset += actual;
        Ok(actual)
    }
}

static INITIALIZED: OnceLock<Mutex<HashSet<TypeId>>> = OnceLock::new();

fn initialized() -> MutexGuard<'static, HashSet<TypeId>> {
    INITIALIZED
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Run `E`'s process-wide setup. Only the first call per engine type does
/// anything; the lock is held across setup so racing callers wait for it.
pub fn init_global<E: Engine>() {
    let mut done = initialized();
    if done.insert(TypeId::of::<E>()) {
        tracing::debug!(engine = std::any::type_name::<E>(), "initializing transport engine");
        E::global_init();
    }
}

pub(crate) fn is_globally_initialized<E: Engine>() -> bool {
    initialized().contains(&TypeId::of::<E>())
}
