//! Transport engine backed by `ureq`.
//!
//! Each handle owns its own `ureq::Agent`, and with it the agent's
//! keep-alive connections, which is what makes a pooled handle cheaper
//! than a fresh one. Status codes are never turned into errors: 4xx/5xx
//! come back as ordinary responses.
//!
//! Response headers are folded into `HttpHeaders`: names arrive lower-case,
//! repeated names are joined with `", "` in arrival order, and values that
//! are not visible ASCII are dropped.

use std::io::{Read, Write};

use ureq::http::{self, Method};
use ureq::{Agent, SendBody};

use crate::engine::{Engine, HandleOption, TransportError, TransportHandle};
use crate::headers::HttpHeaders;

const READ_CHUNK: usize = 16 * 1024;

#[derive(Debug, Clone, Default)]
pub struct UreqEngine;

impl UreqEngine {
    pub fn new() -> Self {
        UreqEngine
    }
}

impl Engine for UreqEngine {
    type Handle = UreqHandle;

    fn create(&self) -> Option<UreqHandle> {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Some(UreqHandle::new(agent))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum BodyMode {
    #[default]
    None,
    Post(Vec<u8>),
    Upload {
        size: u64,
    },
}

/// Configured `ureq` session. Options accumulate until `reset`.
pub struct UreqHandle {
    agent: Agent,
    url: Option<String>,
    body: BodyMode,
    custom_verb: Option<String>,
    headers: Vec<String>,
    status: i32,
    response_headers: HttpHeaders,
}

impl UreqHandle {
    fn new(agent: Agent) -> Self {
        UreqHandle {
            agent,
            url: None,
            body: BodyMode::None,
            custom_verb: None,
            headers: Vec::new(),
            status: -1,
            response_headers: HttpHeaders::new(),
        }
    }

    fn method(&self) -> Result<Method, TransportError> {
        if let Some(verb) = &self.custom_verb {
            return Method::from_bytes(verb.as_bytes())
                .map_err(|e| TransportError::new(format!("invalid method {verb}: {e}")));
        }
        Ok(match self.body {
            BodyMode::None => Method::GET,
            BodyMode::Post(_) => Method::POST,
            BodyMode::Upload { .. } => Method::PUT,
        })
    }

    fn request_builder(&self) -> Result<http::request::Builder, TransportError> {
        let url = self
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| TransportError::new("URL using bad/illegal format or missing URL"))?;

        let mut builder = http::Request::builder().method(self.method()?).uri(url);
        for line in &self.headers {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| TransportError::new(format!("malformed header line: {line}")))?;
            builder = builder.header(name.trim(), value.trim());
        }
        Ok(builder)
    }
}

fn build<B>(builder: http::request::Builder, body: B) -> Result<http::Request<B>, TransportError> {
    builder
        .body(body)
        .map_err(|e| TransportError::new(e.to_string()))
}

/// Declare the upload length unless the caller already supplied one.
fn with_content_length(builder: http::request::Builder, size: u64) -> http::request::Builder {
    let declared = builder
        .headers_ref()
        .is_some_and(|headers| headers.contains_key(http::header::CONTENT_LENGTH));
    if declared {
        builder
    } else {
        builder.header(http::header::CONTENT_LENGTH, size.to_string())
    }
}

fn collect_headers(map: &http::HeaderMap) -> HttpHeaders {
    let mut headers = HttpHeaders::new();
    for name in map.keys() {
        let values: Vec<&str> = map
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        if !values.is_empty() {
            headers.set(name.as_str(), values.join(", "));
        }
    }
    headers
}

impl TransportHandle for UreqHandle {
    fn reset(&mut self) {
        self.url = None;
        self.body = BodyMode::None;
        self.custom_verb = None;
        self.headers.clear();
        self.status = -1;
        self.response_headers = HttpHeaders::new();
    }

    fn set_option(&mut self, option: HandleOption) {
        match option {
            HandleOption::Url(url) => self.url = Some(url),
            HandleOption::Post(body) => self.body = BodyMode::Post(body),
            HandleOption::Upload { size } => self.body = BodyMode::Upload { size },
            HandleOption::CustomRequest(verb) => self.custom_verb = Some(verb),
            HandleOption::Headers(lines) => self.headers = lines,
        }
    }

    fn perform(
        &mut self,
        upload: Option<&mut dyn Read>,
        sink: &mut dyn Write,
    ) -> Result<(), TransportError> {
        let builder = self.request_builder()?;
        let result = match (&self.body, upload) {
            (BodyMode::Post(body), _) => self.agent.run(build(builder, body.as_slice())?),
            (BodyMode::Upload { size }, Some(reader)) => {
                let builder = with_content_length(builder, *size);
                self.agent.run(build(builder, SendBody::from_reader(reader))?)
            }
            _ => self.agent.run(build(builder, ())?),
        };
        let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

        self.status = i32::from(response.status().as_u16());
        self.response_headers = collect_headers(response.headers());

        let mut reader = response.body_mut().as_reader();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            tracing::trace!(bytes = n, "received body chunk");
            sink.write_all(&buf[..n])?;
        }
        Ok(())
    }

    fn response_code(&self) -> i32 {
        self.status
    }

    fn response_headers(&self) -> HttpHeaders {
        self.response_headers.clone()
    }
}
