//! Retry and backoff.
//!
//! This module classifies attempt outcomes (timeouts, throttling, server
//! errors) and drives the bounded retry loop around a send-once transport.
//! Backoff is `base_delay * exponential_base^attempt` plus jitter in
//! `[0, max_jitter)`; sleeping and jitter are injectable for tests.

mod cancel;
mod classify;
mod error;
mod pace;
mod policy;
mod run;

pub use cancel::{CancelToken, SendOptions};
pub use classify::{classify, classify_http_status, classify_transport_error};
pub use error::SendError;
pub use pace::{FixedJitter, JitterSource, RandomJitter, Sleeper, ThreadSleeper};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::RetryEngine;
