//! Metrics collection and reporting

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics collector for the analysis engine
///
/// Written only by the orchestrator; external callers read snapshots.
/// Counters reset only at process start.
#[derive(Clone)]
pub struct EngineMetrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    remote_calls: AtomicU64,
    remote_failures: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    local_fallbacks: AtomicU64,
    remote_latency_us: AtomicU64,
}

impl EngineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                remote_calls: AtomicU64::new(0),
                remote_failures: AtomicU64::new(0),
                cache_hits: AtomicU64::new(0),
                cache_misses: AtomicU64::new(0),
                local_fallbacks: AtomicU64::new(0),
                remote_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record a remote call attempt and its latency
    pub fn record_remote_call(&self, latency_us: u64) {
        self.inner.remote_calls.fetch_add(1, Ordering::Relaxed);
        self.inner
            .remote_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
    }

    /// Record a failed remote call
    pub fn record_remote_failure(&self) {
        self.inner.remote_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record cache hits
    pub fn record_cache_hits(&self, count: u64) {
        self.inner.cache_hits.fetch_add(count, Ordering::Relaxed);
    }

    /// Record cache misses
    pub fn record_cache_misses(&self, count: u64) {
        self.inner.cache_misses.fetch_add(count, Ordering::Relaxed);
    }

    /// Record inputs served by the local fallback path
    pub fn record_local_fallbacks(&self, count: u64) {
        self.inner.local_fallbacks.fetch_add(count, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            remote_calls: self.inner.remote_calls.load(Ordering::Relaxed),
            remote_failures: self.inner.remote_failures.load(Ordering::Relaxed),
            cache_hits: self.inner.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.inner.cache_misses.load(Ordering::Relaxed),
            local_fallbacks: self.inner.local_fallbacks.load(Ordering::Relaxed),
            remote_latency_us: self.inner.remote_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub remote_calls: u64,
    pub remote_failures: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub local_fallbacks: u64,
    pub remote_latency_us: u64,
}

impl MetricsSnapshot {
    /// Average latency per remote call attempt
    pub fn avg_remote_latency_us(&self) -> u64 {
        if self.remote_calls == 0 {
            0
        } else {
            self.remote_latency_us / self.remote_calls
        }
    }

    /// Fraction of remote call attempts that failed
    pub fn remote_failure_rate(&self) -> f64 {
        if self.remote_calls == 0 {
            0.0
        } else {
            self.remote_failures as f64 / self.remote_calls as f64
        }
    }

    /// Fraction of cache probes that hit
    pub fn cache_hit_rate(&self) -> f64 {
        let probes = self.cache_hits + self.cache_misses;
        if probes == 0 {
            0.0
        } else {
            self.cache_hits as f64 / probes as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let metrics = EngineMetrics::new();

        metrics.record_remote_call(5000);
        metrics.record_remote_call(7000);
        metrics.record_remote_failure();
        metrics.record_cache_hits(3);
        metrics.record_cache_misses(1);
        metrics.record_local_fallbacks(4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.remote_calls, 2);
        assert_eq!(snapshot.remote_failures, 1);
        assert_eq!(snapshot.avg_remote_latency_us(), 6000);
        assert_eq!(snapshot.remote_failure_rate(), 0.5);
        assert_eq!(snapshot.cache_hit_rate(), 0.75);
        assert_eq!(snapshot.local_fallbacks, 4);
    }

    #[test]
    fn empty_snapshot_has_zero_rates() {
        let snapshot = EngineMetrics::new().snapshot();
        assert_eq!(snapshot.avg_remote_latency_us(), 0);
        assert_eq!(snapshot.remote_failure_rate(), 0.0);
        assert_eq!(snapshot.cache_hit_rate(), 0.0);
    }
}
