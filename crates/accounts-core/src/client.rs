//! The request pipeline façade: build, then send with retries.
//!
//! [`Client`] never interprets status codes. It hands back the terminal
//! response (success or not) or the error that stopped the retry loop; the
//! resource layer decides which statuses are errors.

use crate::config::ApiConfig;
use crate::request::{self, Method, Request, RequestBuilder};
use crate::retry::{JitterSource, RetryEngine, RetryPolicy, SendError, SendOptions, Sleeper};
use crate::transport::{CurlTransport, Response, Transport};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// Construction-time failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("nil transport handle")]
    MissingTransport,
    #[error("nil resource url")]
    MissingUrl,
    #[error("resource url has no host: {0}")]
    NoHost(Url),
    #[error("failed building resource url: {0:#}")]
    Config(anyhow::Error),
}

/// Blocking client for one resource collection (e.g. `/v1/organisation/accounts`).
#[derive(Debug)]
pub struct Client<T> {
    resource_url: Url,
    host: String,
    builder: RequestBuilder,
    engine: RetryEngine<T>,
}

impl Client<CurlTransport> {
    /// Client over libcurl using the timeout, retry and pool settings in `config`.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let url = config.account_url().map_err(ClientError::Config)?;
        let transport = CurlTransport::new(config.timeout(), config.pool_limits());
        ClientBuilder::new()
            .transport(transport)
            .policy(config.retry_policy())
            .url(url)
            .build()
    }
}

impl<T: Transport> Client<T> {
    pub fn builder() -> ClientBuilder<T> {
        ClientBuilder::new()
    }

    pub fn resource_url(&self) -> &Url {
        &self.resource_url
    }

    /// Value sent in the `Host` header.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn engine(&self) -> &RetryEngine<T> {
        &self.engine
    }

    /// GET `<resource>/<id>`.
    pub fn get(&self, id: &str) -> Result<Response, SendError> {
        self.get_with(id, &SendOptions::default())
    }

    pub fn get_with(&self, id: &str, opts: &SendOptions) -> Result<Response, SendError> {
        let req = self
            .builder
            .build_without_body(Method::Get, self.join(id), &self.host);
        self.engine.send_with(&req, opts)
    }

    /// POST `data` as JSON to the collection.
    pub fn post<D: Serialize + ?Sized>(&self, data: &D) -> Result<Response, SendError> {
        self.post_with(data, &SendOptions::default())
    }

    pub fn post_with<D: Serialize + ?Sized>(
        &self,
        data: &D,
        opts: &SendOptions,
    ) -> Result<Response, SendError> {
        let req = self.builder.build(
            Method::Post,
            self.resource_url.clone(),
            &self.host,
            Some(data),
        );
        self.engine.send_with(&req, opts)
    }

    /// DELETE `<resource>/<id>?<key>=<value>`.
    pub fn delete(&self, id: &str, key: &str, value: &str) -> Result<Response, SendError> {
        self.delete_with(id, key, value, &SendOptions::default())
    }

    pub fn delete_with(
        &self,
        id: &str,
        key: &str,
        value: &str,
        opts: &SendOptions,
    ) -> Result<Response, SendError> {
        let mut req = self
            .builder
            .build_without_body(Method::Delete, self.join(id), &self.host);
        request::set_query(&mut req, key, value);
        self.engine.send_with(&req, opts)
    }

    /// Send a request built elsewhere. `None` fails with [`SendError::NilRequest`].
    pub fn send(&self, request: Option<&Request>) -> Result<Response, SendError> {
        self.engine.try_send(request)
    }

    fn join(&self, id: &str) -> Url {
        let mut url = self.resource_url.clone();
        if !id.is_empty() {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(id);
            }
        }
        url
    }
}

/// Assembles a [`Client`]. `transport` and `url` are required.
pub struct ClientBuilder<T> {
    transport: Option<T>,
    url: Option<Url>,
    policy: RetryPolicy,
    request_builder: RequestBuilder,
    sleeper: Option<Arc<dyn Sleeper>>,
    jitter: Option<Arc<dyn JitterSource>>,
}

impl<T: Transport> Default for ClientBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> ClientBuilder<T> {
    pub fn new() -> Self {
        Self {
            transport: None,
            url: None,
            policy: RetryPolicy::default(),
            request_builder: RequestBuilder::new(),
            sleeper: None,
            jitter: None,
        }
    }

    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn request_builder(mut self, builder: RequestBuilder) -> Self {
        self.request_builder = builder;
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = Some(jitter);
        self
    }

    pub fn build(self) -> Result<Client<T>, ClientError> {
        let transport = self.transport.ok_or(ClientError::MissingTransport)?;
        let url = self.url.ok_or(ClientError::MissingUrl)?;
        let host = host_header(&url).ok_or_else(|| ClientError::NoHost(url.clone()))?;

        let mut engine = RetryEngine::new(transport, self.policy);
        if let Some(sleeper) = self.sleeper {
            engine = engine.with_sleeper(sleeper);
        }
        if let Some(jitter) = self.jitter {
            engine = engine.with_jitter(jitter);
        }

        Ok(Client {
            resource_url: url,
            host,
            builder: self.request_builder,
            engine,
        })
    }
}

/// `host[:port]`, with the port only when it is not the scheme default.
fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::FixedJitter;
    use crate::transport::TransportError;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<Request>>,
        statuses: Mutex<Vec<u16>>,
    }

    impl Recorder {
        fn with_statuses(statuses: &[u16]) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                statuses: Mutex::new(statuses.iter().rev().copied().collect()),
            }
        }
    }

    impl Transport for Recorder {
        fn send(&self, request: &Request) -> Result<Response, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            let status = self.statuses.lock().unwrap().pop().unwrap_or(200);
            Ok(Response::new(status, "{}"))
        }
    }

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _: Duration) {}
    }

    fn client(statuses: &[u16]) -> Client<Arc<Recorder>> {
        Client::builder()
            .transport(Arc::new(Recorder::with_statuses(statuses)))
            .url(Url::parse("http://api.test:8080/v1/organisation/accounts").unwrap())
            .sleeper(Arc::new(NoSleep))
            .jitter(Arc::new(FixedJitter(Duration::ZERO)))
            .build()
            .unwrap()
    }

    fn seen(c: &Client<Arc<Recorder>>) -> Vec<Request> {
        c.engine().transport().seen.lock().unwrap().clone()
    }

    #[test]
    fn missing_transport_is_reported() {
        let err = ClientBuilder::<Arc<Recorder>>::new()
            .url(Url::parse("http://api.test/").unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingTransport));
        assert_eq!(err.to_string(), "nil transport handle");
    }

    #[test]
    fn missing_url_is_reported() {
        let err = ClientBuilder::new()
            .transport(Arc::new(Recorder::default()))
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingUrl));
    }

    #[test]
    fn url_without_host_is_rejected() {
        let err = ClientBuilder::new()
            .transport(Arc::new(Recorder::default()))
            .url(Url::parse("file:///tmp/accounts").unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::NoHost(_)));
    }

    #[test]
    fn host_header_keeps_explicit_port() {
        let c = client(&[]);
        assert_eq!(c.host(), "api.test:8080");
        let u = Url::parse("https://api.test/v1").unwrap();
        assert_eq!(host_header(&u).as_deref(), Some("api.test"));
    }

    #[test]
    fn get_joins_id_onto_resource_path() {
        let c = client(&[200]);
        let resp = c.get("ad27e265-9605-4b4b-a0e5-3003ea9cc4dc").unwrap();
        assert_eq!(resp.status, 200);

        let reqs = seen(&c);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method(), Method::Get);
        assert_eq!(
            reqs[0].url().as_str(),
            "http://api.test:8080/v1/organisation/accounts/ad27e265-9605-4b4b-a0e5-3003ea9cc4dc"
        );
        assert!(reqs[0].body().is_none());
        assert_eq!(reqs[0].header("Host"), Some("api.test:8080"));
    }

    #[test]
    fn trailing_slash_does_not_double_up() {
        let c = Client::builder()
            .transport(Arc::new(Recorder::default()))
            .url(Url::parse("http://api.test/v1/accounts/").unwrap())
            .build()
            .unwrap();
        assert_eq!(c.join("x").as_str(), "http://api.test/v1/accounts/x");
        assert_eq!(c.join("").as_str(), "http://api.test/v1/accounts/");
    }

    #[test]
    fn post_targets_collection_with_body() {
        let c = client(&[201]);
        let data = serde_json::json!({"data": {"id": "1"}});
        let resp = c.post(&data).unwrap();
        assert_eq!(resp.status, 201);

        let reqs = seen(&c);
        assert_eq!(reqs[0].method(), Method::Post);
        assert_eq!(
            reqs[0].url().as_str(),
            "http://api.test:8080/v1/organisation/accounts"
        );
        assert_eq!(reqs[0].body(), Some(&br#"{"data":{"id":"1"}}"#[..]));
        assert_eq!(
            reqs[0].header("Digest"),
            Some("sha-256=a81EUrIBO/xIiQDrhzylMua10yjTg4LrJlxCFp/FDsQ=")
        );
    }

    #[test]
    fn delete_sets_version_query() {
        let c = client(&[204]);
        let resp = c.delete("abc", "version", "7").unwrap();
        assert_eq!(resp.status, 204);
        let reqs = seen(&c);
        assert_eq!(reqs[0].method(), Method::Delete);
        assert_eq!(
            reqs[0].url().as_str(),
            "http://api.test:8080/v1/organisation/accounts/abc?version=7"
        );
    }

    #[test]
    fn non_success_is_returned_not_classified() {
        let c = client(&[404]);
        let resp = c.get("missing").unwrap();
        assert_eq!(resp.status, 404);
    }

    #[test]
    fn retryable_status_is_retried_through_client() {
        let c = client(&[429, 201]);
        let resp = c.post(&serde_json::json!({})).unwrap();
        assert_eq!(resp.status, 201);
        assert_eq!(seen(&c).len(), 2);
    }

    #[test]
    fn nil_request_fails_fast() {
        let c = client(&[]);
        let err = c.send(None).unwrap_err();
        assert_eq!(err.to_string(), "nil request");
        assert!(seen(&c).is_empty());
    }
}
