//! Caller-side bounds on a whole retry loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cloneable cancellation flag shared between a caller and an in-flight send.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-call options for [`crate::retry::RetryEngine::send_with`].
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub cancel: Option<CancelToken>,
    /// No backoff sleep may end past this instant.
    pub deadline: Option<Instant>,
}

impl SendOptions {
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `budget` from now.
    pub fn with_budget(self, budget: Duration) -> Self {
        self.with_deadline(Instant::now() + budget)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Whether sleeping `delay` from now would overrun the deadline.
    pub fn overruns_deadline(&self, delay: Duration) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now()
                .checked_add(delay)
                .map_or(true, |wake| wake > deadline),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn default_options_never_stop() {
        let opts = SendOptions::default();
        assert!(!opts.is_cancelled());
        assert!(!opts.overruns_deadline(Duration::from_secs(3600)));
    }

    #[test]
    fn deadline_overrun() {
        let opts = SendOptions::default().with_budget(Duration::from_secs(10));
        assert!(!opts.overruns_deadline(Duration::from_millis(10)));
        assert!(opts.overruns_deadline(Duration::from_secs(60)));
        assert!(opts.overruns_deadline(Duration::MAX));
    }
}
