//! libcurl-backed transport.
//!
//! One `send` is one HTTP exchange on a pooled easy handle. Redirects are not
//! followed. `Accept-Encoding` is handed to libcurl rather than sent verbatim,
//! so gzip bodies arrive decoded.

use super::pool::{ConnectionPool, PoolLimits};
use super::{Response, Transport, TransportError};
use crate::request::{Method, Request, ACCEPT_ENCODING_KEY};
use curl::easy::{Easy, List};
use std::str;
use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Blocking transport over a bounded pool of libcurl handles.
#[derive(Debug)]
pub struct CurlTransport {
    pool: ConnectionPool,
    timeout: Duration,
    connect_timeout: Duration,
}

impl CurlTransport {
    /// `timeout` bounds each attempt end to end.
    pub fn new(timeout: Duration, limits: PoolLimits) -> Self {
        Self {
            pool: ConnectionPool::new(limits),
            timeout,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT.min(timeout),
        }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn configure(&self, easy: &mut Easy, request: &Request) -> Result<(), TransportError> {
        easy.url(request.url().as_str())?;
        easy.follow_location(false)?;
        easy.timeout(self.timeout)?;
        easy.connect_timeout(self.connect_timeout)?;

        match request.method() {
            Method::Get => easy.get(true)?,
            Method::Post => easy.post(true)?,
            Method::Delete => easy.custom_request("DELETE")?,
        }
        match (request.method(), request.body()) {
            (Method::Post, body) => easy.post_fields_copy(body.unwrap_or_default())?,
            (Method::Delete, Some(body)) => easy.post_fields_copy(body)?,
            (Method::Get, _) | (Method::Delete, None) => {}
        }

        let mut list = List::new();
        for (name, value) in request.headers() {
            if name.eq_ignore_ascii_case(ACCEPT_ENCODING_KEY) {
                easy.accept_encoding(value)?;
                continue;
            }
            list.append(&format!("{}: {}", name, value))?;
        }
        // no 100-continue round trip for larger bodies
        list.append("Expect:")?;
        easy.http_headers(list)?;
        Ok(())
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let mut easy = self.pool.checkout();
        self.configure(&mut easy, request)?;

        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        let status = u16::try_from(code)
            .map_err(|_| TransportError::Other(format!("invalid status code {}", code)))?;
        tracing::trace!(method = %request.method(), url = %request.url(), status, "exchange complete");

        Ok(Response {
            status,
            headers: parse_header_lines(&header_lines),
            body,
        })
    }
}

/// Parse raw header lines into name/value pairs. Only the final response's
/// headers are kept (an interim `100 Continue` block is discarded).
pub(crate) fn parse_header_lines(lines: &[String]) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            headers.clear();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header_lines_name_value() {
        let lines = [
            "HTTP/1.1 201 Created".to_string(),
            "Content-Type: application/vnd.api+json".to_string(),
            "Content-Length: 2".to_string(),
            "".to_string(),
        ];
        let h = parse_header_lines(&lines);
        assert_eq!(h.len(), 2);
        assert_eq!(h[0], ("Content-Type".into(), "application/vnd.api+json".into()));
        assert_eq!(h[1], ("Content-Length".into(), "2".into()));
    }

    #[test]
    fn parse_header_lines_drops_interim_response() {
        let lines = [
            "HTTP/1.1 100 Continue".to_string(),
            "X-Interim: yes".to_string(),
            "".to_string(),
            "HTTP/1.1 200 OK".to_string(),
            "Date: Wed, 21 Oct 2015 07:28:00 GMT".to_string(),
        ];
        let h = parse_header_lines(&lines);
        assert_eq!(h, vec![("Date".into(), "Wed, 21 Oct 2015 07:28:00 GMT".into())]);
    }

    #[test]
    fn connect_timeout_never_exceeds_attempt_timeout() {
        let t = CurlTransport::new(Duration::from_secs(2), PoolLimits::default());
        assert_eq!(t.timeout(), Duration::from_secs(2));
        assert_eq!(t.connect_timeout, Duration::from_secs(2));
        let t = CurlTransport::new(Duration::from_secs(100), PoolLimits::default());
        assert_eq!(t.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }
}
