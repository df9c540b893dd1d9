//! Bounded pool of reusable libcurl easy handles.
//!
//! libcurl keeps keep-alive connections in a per-handle cache, so reusing a
//! handle reuses its connections. The pool caps how many idle handles are
//! retained, how many connections each handle may cache, and how many
//! requests may be in flight at once; callers over the in-flight cap block
//! until a handle is returned.

use curl::easy::Easy;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Connection limits (the `[pool]` config section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolLimits {
    /// Idle handles kept for reuse.
    pub max_idle_connections: usize,
    /// Cached connections per handle.
    pub max_idle_per_host: usize,
    /// Requests allowed in flight at once (the client talks to a single host).
    pub max_connections_per_host: usize,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_idle_connections: 100,
            max_idle_per_host: 100,
            max_connections_per_host: 100,
        }
    }
}

#[derive(Default)]
struct PoolState {
    idle: Vec<Easy>,
    in_flight: usize,
}

/// Thread-safe handle pool. See module docs.
pub struct ConnectionPool {
    limits: PoolLimits,
    state: Mutex<PoolState>,
    returned: Condvar,
    limits_applied: AtomicUsize,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ConnectionPool")
            .field("limits", &self.limits)
            .field("idle", &state.idle.len())
            .field("in_flight", &state.in_flight)
            .finish()
    }
}

impl ConnectionPool {
    pub fn new(limits: PoolLimits) -> Self {
        Self {
            limits,
            state: Mutex::new(PoolState::default()),
            returned: Condvar::new(),
            limits_applied: AtomicUsize::new(0),
        }
    }

    pub fn limits(&self) -> PoolLimits {
        self.limits
    }

    /// Take a handle, blocking while `max_connections_per_host` requests are in flight.
    /// The handle goes back to the pool when the guard drops.
    pub fn checkout(&self) -> PooledEasy<'_> {
        let cap = self.limits.max_connections_per_host.max(1);
        let mut state = self.lock();
        while state.in_flight >= cap {
            state = self
                .returned
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.in_flight += 1;
        let easy = state.idle.pop();
        drop(state);

        // reset on checkin drops per-handle options, so limits go on every checkout
        let mut easy = easy.unwrap_or_else(Easy::new);
        self.apply_limits(&mut easy);
        PooledEasy {
            pool: self,
            easy: Some(easy),
        }
    }

    pub fn idle_count(&self) -> usize {
        self.lock().idle.len()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// How many times per-handle limits have been applied (once per checkout).
    pub fn limits_applied(&self) -> usize {
        self.limits_applied.load(Ordering::Relaxed)
    }

    fn apply_limits(&self, easy: &mut Easy) {
        if let Err(e) = easy.max_connects(max_connects(&self.limits)) {
            tracing::debug!("curl max_connects not applied: {}", e);
        }
        self.limits_applied.fetch_add(1, Ordering::Relaxed);
    }

    fn checkin(&self, mut easy: Easy) {
        // reset clears options but keeps the handle's connection cache
        easy.reset();
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.idle.len() < self.limits.max_idle_connections {
            state.idle.push(easy);
        }
        drop(state);
        self.returned.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// libcurl's connection cache size for one handle.
fn max_connects(limits: &PoolLimits) -> u32 {
    u32::try_from(limits.max_idle_per_host).unwrap_or(u32::MAX)
}

/// A checked-out handle; returned to its pool on drop.
pub struct PooledEasy<'a> {
    pool: &'a ConnectionPool,
    easy: Option<Easy>,
}

impl Deref for PooledEasy<'_> {
    type Target = Easy;

    fn deref(&self) -> &Easy {
        self.easy.as_ref().expect("handle present until drop")
    }
}

impl DerefMut for PooledEasy<'_> {
    fn deref_mut(&mut self) -> &mut Easy {
        self.easy.as_mut().expect("handle present until drop")
    }
}

impl Drop for PooledEasy<'_> {
    fn drop(&mut self) {
        if let Some(easy) = self.easy.take() {
            self.pool.checkin(easy);
        }
    }
}
