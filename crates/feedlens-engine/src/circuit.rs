//! Circuit breaker for the remote inference API
//!
//! Binary open/closed model: a reset re-admits traffic directly, with no
//! half-open trial stage. The adaptive throttle already meters post-reset
//! traffic, so the first calls after a reset arrive at most once per
//! `min_interval`.

use parking_lot::Mutex;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitState {
    /// Normal operation, remote calls permitted
    Closed,
    /// Remote calls bypassed until the reset deadline passes
    Open,
}

/// Tracks consecutive remote failures and gates remote admission
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_timeout: Duration,
    state: Mutex<BreakerState>,
}

struct BreakerState {
    consecutive_failures: u32,
    /// Set while open; reaching it closes the circuit on the next check
    reset_deadline: Option<Instant>,
}

impl CircuitBreaker {
    /// Create a breaker that opens after `failure_threshold` consecutive
    /// failures and stays open for `reset_timeout`
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
            state: Mutex::new(BreakerState {
                consecutive_failures: 0,
                reset_deadline: None,
            }),
        }
    }

    /// Check whether remote calls are currently bypassed.
    ///
    /// Side-effecting: when the reset deadline has passed, this performs
    /// the open -> closed transition and clears the failure count, so the
    /// caller's next remote call is the trial.
    pub fn is_open(&self) -> bool {
        let mut state = self.state.lock();
        match state.reset_deadline {
            Some(deadline) if Instant::now() >= deadline => {
                info!("circuit closed after reset timeout, next remote call is the trial");
                state.reset_deadline = None;
                state.consecutive_failures = 0;
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Record a successful remote call
    pub fn record_success(&self) {
        let mut state = self.state.lock();
        if state.consecutive_failures > 0 {
            debug!(
                failures = state.consecutive_failures,
                "resetting failure count after remote success"
            );
            state.consecutive_failures = 0;
        }
    }

    /// Record a failed remote call, opening the circuit at the threshold
    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.consecutive_failures += 1;

        if state.consecutive_failures >= self.failure_threshold {
            let deadline = Instant::now() + self.reset_timeout;
            if state.reset_deadline.is_none() {
                warn!(
                    failures = state.consecutive_failures,
                    reset_timeout = ?self.reset_timeout,
                    "circuit opened"
                );
            }
            state.reset_deadline = Some(deadline);
        } else {
            debug!(
                failures = state.consecutive_failures,
                threshold = self.failure_threshold,
                "remote failure recorded"
            );
        }
    }

    /// Non-transitioning peek at the current state, for status snapshots
    pub fn current_state(&self) -> CircuitState {
        let state = self.state.lock();
        match state.reset_deadline {
            Some(deadline) if Instant::now() < deadline => CircuitState::Open,
            _ => CircuitState::Closed,
        }
    }

    /// Current consecutive failure count
    pub fn consecutive_failures(&self) -> u32 {
        self.state.lock().consecutive_failures
    }
}
