//! Request and response value types seen by the worker
//!
//! These are deliberately small: the worker only ever inspects the method,
//! the URL and the status code. Bodies are carried as raw bytes so cached
//! fonts and images survive untouched.

use crate::error::{Result, WorkerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Body of the response synthesized when neither network nor cache can answer
pub const NETWORK_ERROR_BODY: &str = "Network error";

/// Status of the response synthesized when neither network nor cache can answer
pub const NETWORK_ERROR_STATUS: u16 = 503;

/// HTTP request method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    /// Any extension method, stored upper-cased
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Other(m) => m,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Err(WorkerError::Other("empty HTTP method".to_string()));
        }
        Ok(match upper.as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            _ => Method::Other(upper),
        })
    }
}

/// An intercepted request: one per fetch event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub url: Url,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    /// Parse an absolute URL into a GET request
    pub fn get(url: &str) -> Result<Self> {
        Ok(Self::new(Method::Get, parse_url(url)?))
    }

    /// Resolve `url` against `origin` (absolute URLs pass through) into a GET request
    pub fn get_relative(origin: &Url, url: &str) -> Result<Self> {
        let resolved = origin.join(url).map_err(|e| WorkerError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(Method::Get, resolved))
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::Get
    }

    /// Key used to match this request inside a cache: method plus URL, fragment dropped
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        format!("{} {}", self.method, url)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| WorkerError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// A response, either live from the network, replayed from a cache, or synthesized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The plain-text 503 returned when a strategy runs out of options
    pub fn network_error() -> Self {
        Self::new(NETWORK_ERROR_STATUS, NETWORK_ERROR_BODY)
            .with_header("content-type", "text/plain")
    }

    /// Success means a 2xx status
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
