//! Request and response values exchanged with `Connection`.
//!
//! # Design
//! These are plain data. The caller builds an `HttpRequest`, hands a
//! reference to `Connection::blocking_request`, and receives an owned
//! `HttpResponse`. Nothing here touches the network.
//!
//! `HttpMethod` is closed: the only way to meet an unknown verb is through
//! the fallible `FromStr` / `TryFrom<i32>` conversions, so the executor
//! never has to handle one at dispatch time.

use std::fmt;
use std::str::FromStr;

use crate::error::HttpError;
use crate::headers::HttpHeaders;

/// Request target. Treated as an opaque string; no parsing is done and an
/// invalid URL is only reported by the engine when the request runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    path: String,
}

impl Url {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// A URL is valid iff it is non-empty.
    pub fn is_valid(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for Url {
    fn from(path: &str) -> Self {
        Url::new(path)
    }
}

impl From<String> for Url {
    fn from(path: String) -> Self {
        Url::new(path)
    }
}

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(HttpError::InvalidMethod(other.to_string())),
        }
    }
}

/// Wire discriminants: 0 = GET, 1 = POST, 2 = PUT, 3 = DELETE.
impl TryFrom<i32> for HttpMethod {
    type Error = HttpError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(HttpMethod::Get),
            1 => Ok(HttpMethod::Post),
            2 => Ok(HttpMethod::Put),
            3 => Ok(HttpMethod::Delete),
            other => Err(HttpError::InvalidMethod(other.to_string())),
        }
    }
}

/// An outbound HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<Url>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    pub fn get(url: impl Into<Url>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<Url>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(HttpMethod::Post, url).with_body(body)
    }

    pub fn put(url: impl Into<Url>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(HttpMethod::Put, url).with_body(body)
    }

    pub fn delete(url: impl Into<Url>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Shorthand for setting the `Content-Type` header.
    pub fn set_content_type(&mut self, mime: impl Into<String>) {
        self.headers.set("Content-Type", mime);
    }

    /// Human-readable dump: request line, one line per header, then a blank
    /// line and the body when there is one.
    pub fn debug_string(&self) -> String {
        let mut out = format!("{} {}", self.method, self.url);
        for (name, value) in self.headers.iter() {
            out.push('\n');
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
        }
        if !self.body.is_empty() {
            out.push_str("\n\n");
            out.push_str(&String::from_utf8_lossy(&self.body));
        }
        out
    }
}

/// An inbound HTTP response.
///
/// Only produced by a completed exchange, so `status` is always set on a
/// response returned from `Connection::blocking_request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: i32,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Sentinel for "status not yet set".
    pub const STATUS_UNSET: i32 = -1;

    pub fn new() -> Self {
        Self {
            status: Self::STATUS_UNSET,
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}
