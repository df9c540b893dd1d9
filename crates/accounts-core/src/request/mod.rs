//! Outbound request construction.
//!
//! Every request carries `Host`, `Date`, `Accept` and `Accept-Encoding`.
//! Requests with a body also carry `Content-Type`, `Content-Length` and a
//! `Digest` computed over the exact bytes that will be sent. The body is
//! buffered so the same bytes can be replayed on every retry attempt.

mod digest;

pub use digest::{digest, digest_path};

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use url::Url;

pub const HOST_KEY: &str = "Host";
pub const DATE_KEY: &str = "Date";
pub const ACCEPT_KEY: &str = "Accept";
pub const ACCEPT_ENCODING_KEY: &str = "Accept-Encoding";
pub const CONTENT_TYPE_KEY: &str = "Content-Type";
pub const CONTENT_LENGTH_KEY: &str = "Content-Length";
pub const DIGEST_KEY: &str = "Digest";

pub const CONTENT_TYPE_VALUE: &str = "application/vnd.api+json";
pub const ACCEPT_ENCODING_VALUE: &str = "gzip";

/// HTTP methods used by the accounts API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request. Only the query string can change after `build`
/// (see [`set_query`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    digest: Option<String>,
}

impl Request {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

/// Source of the current time for the `Date` header.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Builds signed requests. Cheap to clone; the clock is shared.
#[derive(Clone)]
pub struct RequestBuilder {
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder").finish_non_exhaustive()
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Build a request. When `data` is `Some`, it is serialised to JSON and the
    /// body headers are added. A value that fails to serialise is sent as an
    /// empty body (with matching length and digest) instead of failing.
    pub fn build<D>(&self, method: Method, url: Url, host: &str, data: Option<&D>) -> Request
    where
        D: Serialize + ?Sized,
    {
        let mut headers = Vec::with_capacity(7);
        set_header(&mut headers, HOST_KEY, host);
        set_header(
            &mut headers,
            DATE_KEY,
            &httpdate::fmt_http_date(self.clock.now()),
        );
        set_header(&mut headers, ACCEPT_KEY, CONTENT_TYPE_VALUE);
        set_header(&mut headers, ACCEPT_ENCODING_KEY, ACCEPT_ENCODING_VALUE);

        let body = data.map(|d| match serde_json::to_vec(d) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%method, %url, "request body failed to serialise, sending empty body: {}", e);
                Vec::new()
            }
        });

        let digest = body.as_deref().map(digest::digest);
        if let (Some(bytes), Some(d)) = (body.as_deref(), digest.as_deref()) {
            set_header(&mut headers, CONTENT_TYPE_KEY, CONTENT_TYPE_VALUE);
            set_header(&mut headers, CONTENT_LENGTH_KEY, &bytes.len().to_string());
            set_header(&mut headers, DIGEST_KEY, d);
        }

        Request {
            method,
            url,
            headers,
            body,
            digest,
        }
    }

    /// Build a request that carries no body (GET, DELETE).
    pub fn build_without_body(&self, method: Method, url: Url, host: &str) -> Request {
        self.build::<()>(method, url, host, None)
    }
}

/// Set a single query parameter, replacing any existing values for `key`.
/// Calling it twice with the same arguments leaves the same URL.
pub fn set_query(request: &mut Request, key: &str, value: &str) {
    let kept: Vec<(String, String)> = request
        .url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut pairs = request.url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &kept {
        pairs.append_pair(k, v);
    }
    pairs.append_pair(key, value);
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}
