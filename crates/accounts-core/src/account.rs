//! Account operations over [`Client`].
//!
//! This layer owns status interpretation: each operation accepts exactly one
//! success status and hands everything else to the classifier.

use crate::client::Client;
use crate::retry::{SendError, SendOptions};
use crate::status::{Classify, ClassifiedError, StatusClassifier};
use crate::transport::{Response, Transport};
use serde_json::Value;

/// Query parameter carrying the optimistic-concurrency version on DELETE.
pub const VERSION_KEY: &str = "version";

const CREATED: u16 = 201;
const OK: u16 = 200;
const NO_CONTENT: u16 = 204;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// No response: fatal transport error, spent timeouts, or a nil request.
    #[error(transparent)]
    Send(#[from] SendError),
    /// A terminal response with an unexpected status.
    #[error(transparent)]
    Status(#[from] ClassifiedError),
    /// The success body was not JSON.
    #[error("failed decoding response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AccountError {
    /// Status code of the response behind this error, if there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AccountError::Status(e) => Some(e.status_code),
            _ => None,
        }
    }
}

/// The accounts resource.
#[derive(Debug)]
pub struct Accounts<T, C = StatusClassifier> {
    client: Client<T>,
    classifier: C,
}

impl<T: Transport> Accounts<T> {
    pub fn new(client: Client<T>) -> Self {
        Self::with_classifier(client, StatusClassifier::new())
    }
}

impl<T: Transport, C: Classify> Accounts<T, C> {
    pub fn with_classifier(client: Client<T>, classifier: C) -> Self {
        Self { client, classifier }
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    /// POST a new account document; returns the created resource.
    pub fn create(&self, data: &Value) -> Result<Value, AccountError> {
        self.create_with(data, &SendOptions::default())
    }

    pub fn create_with(&self, data: &Value, opts: &SendOptions) -> Result<Value, AccountError> {
        let resp = self.client.post_with(data, opts)?;
        self.expect(&resp, CREATED)?;
        decode(&resp)
    }

    /// GET one account. A missing account is an error (`status code 404: ...`).
    pub fn fetch(&self, id: &str) -> Result<Value, AccountError> {
        self.fetch_with(id, &SendOptions::default())
    }

    pub fn fetch_with(&self, id: &str, opts: &SendOptions) -> Result<Value, AccountError> {
        let resp = self.client.get_with(id, opts)?;
        self.expect(&resp, OK)?;
        decode(&resp)
    }

    /// DELETE one account at `version`.
    pub fn delete(&self, id: &str, version: u64) -> Result<(), AccountError> {
        self.delete_with(id, version, &SendOptions::default())
    }

    pub fn delete_with(
        &self,
        id: &str,
        version: u64,
        opts: &SendOptions,
    ) -> Result<(), AccountError> {
        let resp = self
            .client
            .delete_with(id, VERSION_KEY, &version.to_string(), opts)?;
        self.expect(&resp, NO_CONTENT)
    }

    fn expect(&self, resp: &Response, status: u16) -> Result<(), AccountError> {
        if resp.status == status {
            return Ok(());
        }
        let err = self.classifier.classify(resp);
        tracing::debug!(expected = status, got = resp.status, "{}", err);
        Err(err.into())
    }
}

fn decode(resp: &Response) -> Result<Value, AccountError> {
    Ok(serde_json::from_slice(&resp.body)?)
}
