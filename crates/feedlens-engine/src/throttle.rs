//! Adaptive minimum-interval rate limiter
//!
//! Multiplicative backoff on failure, gentle multiplicative ease on
//! sustained success: the interval converges toward the fastest rate the
//! remote API sustains without manual tuning.

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Backoff growth factor applied on failure
const BACKOFF_FACTOR: f32 = 1.5;

/// Ease factor applied on sustained success
const EASE_FACTOR: f32 = 0.9;

/// Outcome of a remote call, as seen by the throttle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// Call succeeded end to end (including parsing)
    Success,
    /// Call failed (network, timeout, parse)
    Failure,
    /// Call was rejected for quota/rate reasons; backs off to the ceiling
    Quota,
}

/// Self-tuning minimum-interval limiter for remote calls
pub struct AdaptiveThrottle {
    floor: Duration,
    ceiling: Duration,
    state: Mutex<ThrottleState>,
}

struct ThrottleState {
    min_interval: Duration,
    last_request: Option<Instant>,
    /// Set by failures, cleared by the next adjustment; blocks easing so
    /// one success right after a failure does not speed us back up
    failed_since_adjust: bool,
}

impl AdaptiveThrottle {
    /// Create a throttle bounded to `[floor, ceiling]`, starting at the
    /// floor
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        let ceiling = ceiling.max(floor);
        Self {
            floor,
            ceiling,
            state: Mutex::new(ThrottleState {
                min_interval: floor,
                last_request: None,
                failed_since_adjust: false,
            }),
        }
    }

    /// Sleep until `min_interval` has elapsed since the previous request,
    /// then claim the send slot.
    ///
    /// Concurrent callers serialize: each claims its own slot, so two
    /// batches can never send closer together than `min_interval`.
    pub async fn wait_if_needed(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock();
                let now = Instant::now();
                match state.last_request {
                    Some(last) => {
                        let elapsed = now.duration_since(last);
                        if elapsed >= state.min_interval {
                            state.last_request = Some(now);
                            return;
                        }
                        state.min_interval - elapsed
                    }
                    None => {
                        state.last_request = Some(now);
                        return;
                    }
                }
            };
            tokio::time::sleep(wait).await;
        }
    }

    /// Adjust the interval based on a remote call outcome
    pub fn adjust(&self, outcome: RemoteOutcome) {
        let mut state = self.state.lock();
        match outcome {
            RemoteOutcome::Success => {
                if !state.failed_since_adjust && state.min_interval > self.floor {
                    state.min_interval = state.min_interval.mul_f32(EASE_FACTOR).max(self.floor);
                    debug!(interval = ?state.min_interval, "throttle eased");
                }
                state.failed_since_adjust = false;
            }
            RemoteOutcome::Failure => {
                state.min_interval = state
                    .min_interval
                    .mul_f32(BACKOFF_FACTOR)
                    .min(self.ceiling);
                state.failed_since_adjust = true;
                debug!(interval = ?state.min_interval, "throttle backed off");
            }
            RemoteOutcome::Quota => {
                state.min_interval = self.ceiling;
                state.failed_since_adjust = true;
                debug!(interval = ?state.min_interval, "quota rejection, throttle at ceiling");
            }
        }
    }

    /// Current minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.state.lock().min_interval
    }

    /// Whether the throttle is currently above its floor
    pub fn is_backing_off(&self) -> bool {
        self.min_interval() > self.floor
    }
}
