//! Scripted in-memory engine for unit tests.
//!
//! Records every option applied and every exchange performed, counts
//! handle creation and disposal, and replays a configurable outcome.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::engine::{Engine, HandleOption, TransportError, TransportHandle};
use crate::headers::HttpHeaders;

/// What the next exchanges should look like.
#[derive(Debug, Clone)]
pub struct Script {
    pub fail_create: bool,
    pub status: i32,
    pub chunks: Vec<Vec<u8>>,
    pub failure: Option<String>,
    /// Sizes requested from the upload reader, cycled.
    pub upload_chunks: Vec<usize>,
    pub response_headers: Vec<(String, String)>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            fail_create: false,
            status: 200,
            chunks: Vec::new(),
            failure: None,
            upload_chunks: vec![16],
            response_headers: Vec::new(),
        }
    }
}

/// One call to `perform`, as the engine saw it.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub handle_id: usize,
    pub options: Vec<HandleOption>,
    pub uploaded: Vec<u8>,
    /// `(requested, produced)` per upload read.
    pub upload_reads: Vec<(usize, usize)>,
}

impl Exchange {
    pub fn has_upload(&self) -> bool {
        self.options
            .iter()
            .any(|o| matches!(o, HandleOption::Upload { .. }))
    }

    pub fn header_lines(&self) -> Vec<String> {
        self.options
            .iter()
            .filter_map(|o| match o {
                HandleOption::Headers(lines) => Some(lines.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

#[derive(Default)]
struct StubState {
    script: Mutex<Script>,
    exchanges: Mutex<Vec<Exchange>>,
    created: AtomicUsize,
    disposed: AtomicUsize,
    resets: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct StubEngine {
    state: Arc<StubState>,
}

impl StubEngine {
    pub fn new(script: Script) -> Self {
        let engine = StubEngine::default();
        engine.set_script(script);
        engine
    }

    pub fn set_script(&self, script: Script) {
        *self.state.script.lock().unwrap() = script;
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.state.exchanges.lock().unwrap().clone()
    }

    pub fn created(&self) -> usize {
        self.state.created.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.state.disposed.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.state.resets.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.created() - self.disposed()
    }
}

impl Engine for StubEngine {
    type Handle = StubHandle;

    fn create(&self) -> Option<StubHandle> {
        if self.state.script.lock().unwrap().fail_create {
            return None;
        }
        let id = self.state.created.fetch_add(1, Ordering::SeqCst);
        Some(StubHandle {
            id,
            options: Vec::new(),
            status: -1,
            response_headers: HttpHeaders::new(),
            state: Arc::clone(&self.state),
        })
    }
}

pub struct StubHandle {
    id: usize,
    options: Vec<HandleOption>,
    status: i32,
    response_headers: HttpHeaders,
    state: Arc<StubState>,
}

impl StubHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn options(&self) -> &[HandleOption] {
        &self.options
    }
}

impl TransportHandle for StubHandle {
    fn reset(&mut self) {
        self.state.resets.fetch_add(1, Ordering::SeqCst);
        self.options.clear();
        self.status = -1;
        self.response_headers = HttpHeaders::new();
    }

    fn set_option(&mut self, option: HandleOption) {
        self.options.push(option);
    }

    fn perform(
        &mut self,
        upload: Option<&mut dyn Read>,
        sink: &mut dyn Write,
    ) -> Result<(), TransportError> {
        let script = self.state.script.lock().unwrap().clone();
        let mut exchange = Exchange {
            handle_id: self.id,
            options: self.options.clone(),
            uploaded: Vec::new(),
            upload_reads: Vec::new(),
        };

        let upload_size = self.options.iter().find_map(|o| match o {
            HandleOption::Upload { size } => Some(*size as usize),
            _ => None,
        });
        if let (Some(size), Some(reader)) = (upload_size, upload) {
            for &requested in script.upload_chunks.iter().cycle() {
                let mut buf = vec![0u8; requested];
                let produced = reader.read(&mut buf)?;
                exchange.upload_reads.push((requested, produced));
                exchange.uploaded.extend_from_slice(&buf[..produced]);
                if produced == 0 || exchange.uploaded.len() >= size {
                    break;
                }
            }
        }
        self.state.exchanges.lock().unwrap().push(exchange);

        if let Some(message) = script.failure {
            return Err(TransportError::new(message));
        }
        for chunk in &script.chunks {
            sink.write_all(chunk)?;
        }
        self.status = script.status;
        self.response_headers = script.response_headers.into_iter().collect();
        Ok(())
    }

    fn response_code(&self) -> i32 {
        self.status
    }

    fn response_headers(&self) -> HttpHeaders {
        self.response_headers.clone()
    }
}

impl Drop for StubHandle {
    fn drop(&mut self) {
        self.state.disposed.fetch_add(1, Ordering::SeqCst);
    }
}
