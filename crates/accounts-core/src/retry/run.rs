//! Retry loop: send until the outcome is terminal or the policy says stop.

use super::cancel::SendOptions;
use super::classify;
use super::error::SendError;
use super::pace::{JitterSource, RandomJitter, Sleeper, ThreadSleeper};
use super::policy::{RetryDecision, RetryPolicy};
use crate::request::Request;
use crate::transport::{Response, Transport, TransportError};
use std::fmt;
use std::sync::Arc;

/// Wraps a send-once [`Transport`] with bounded retries.
///
/// Attempts for one call are strictly sequential; `attempt` and the delay are
/// local to the call, so one engine can serve many threads.
pub struct RetryEngine<T> {
    transport: T,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn JitterSource>,
}

impl<T: fmt::Debug> fmt::Debug for RetryEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryEngine")
            .field("transport", &self.transport)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> RetryEngine<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            sleeper: Arc::new(ThreadSleeper),
            jitter: Arc::new(RandomJitter),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send with retries. Returns the terminal response, the last response
    /// once retries are spent, or the transport error that stopped the loop.
    pub fn send(&self, request: &Request) -> Result<Response, SendError> {
        self.send_with(request, &SendOptions::default())
    }

    /// Like [`send`](Self::send) for callers that may not have a request.
    pub fn try_send(&self, request: Option<&Request>) -> Result<Response, SendError> {
        match request {
            Some(request) => self.send(request),
            None => Err(SendError::NilRequest),
        }
    }

    /// Send with a cancel token and/or deadline bounding the whole loop.
    /// When either stops the loop after an attempt, that attempt's outcome is
    /// returned.
    pub fn send_with(&self, request: &Request, opts: &SendOptions) -> Result<Response, SendError> {
        if opts.is_cancelled() {
            return Err(SendError::Cancelled);
        }

        let mut attempt: u32 = 0;
        loop {
            let outcome = self.transport.send(request);
            let kind = classify::classify(&outcome);
            tracing::debug!(
                method = %request.method(),
                url = %request.url(),
                attempt,
                ?kind,
                "attempt finished"
            );

            let backoff = match self.policy.decide(attempt, kind) {
                RetryDecision::NoRetry => {
                    if kind.is_retryable() {
                        tracing::warn!(
                            attempts = attempt + 1,
                            ?kind,
                            "retries exhausted, returning last outcome"
                        );
                    }
                    return finish(outcome);
                }
                RetryDecision::RetryAfter(backoff) => backoff,
            };

            let delay = backoff.saturating_add(self.jitter.jitter(self.policy.max_jitter));
            if opts.is_cancelled() {
                tracing::debug!(attempt, "cancelled, not retrying");
                return finish(outcome);
            }
            if opts.overruns_deadline(delay) {
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "deadline too close, not retrying");
                return finish(outcome);
            }

            tracing::warn!(
                attempt,
                ?kind,
                delay_ms = delay.as_millis() as u64,
                "retrying after backoff"
            );
            self.sleeper.sleep(delay);
            if opts.is_cancelled() {
                tracing::debug!(attempt, "cancelled during backoff");
                return finish(outcome);
            }
            attempt += 1;
        }
    }
}

fn finish(outcome: Result<Response, TransportError>) -> Result<Response, SendError> {
    outcome.map_err(SendError::from)
}
