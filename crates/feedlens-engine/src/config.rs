//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Engine configuration
///
/// Loaded once at process start; the engine does not reload it at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Consecutive remote failures before the circuit opens
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Seconds the circuit stays open before the next trial
    #[serde(default = "default_reset_timeout_secs")]
    pub reset_timeout_secs: u64,

    /// Throttle floor in milliseconds (fastest sustainable interval)
    #[serde(default = "default_throttle_floor_ms")]
    pub throttle_floor_ms: u64,

    /// Throttle ceiling in milliseconds (maximum backoff interval)
    #[serde(default = "default_throttle_ceiling_ms")]
    pub throttle_ceiling_ms: u64,

    /// Per-call timeout for the remote API, in seconds
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,

    /// Maximum entries per cache partition
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Concurrent local analysis batches (defaults to available cores)
    #[serde(default = "default_local_concurrency")]
    pub local_concurrency: usize,

    /// Concurrent in-flight remote batches
    #[serde(default = "default_remote_concurrency")]
    pub remote_concurrency: usize,

    /// Batch sizes for remote dispatch, by average input length
    #[serde(default = "default_remote_batch_sizes")]
    pub remote_batch_sizes: BatchSizeTable,

    /// Batch sizes for local analysis (larger: no quota cost)
    #[serde(default = "default_local_batch_sizes")]
    pub local_batch_sizes: BatchSizeTable,
}

impl EngineConfig {
    /// Load configuration from a YAML file, filling omitted fields with
    /// defaults
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.failure_threshold == 0 {
            anyhow::bail!("failure_threshold must be at least 1");
        }
        if self.throttle_floor_ms > self.throttle_ceiling_ms {
            anyhow::bail!(
                "throttle_floor_ms ({}) exceeds throttle_ceiling_ms ({})",
                self.throttle_floor_ms,
                self.throttle_ceiling_ms
            );
        }
        if self.local_concurrency == 0 || self.remote_concurrency == 0 {
            anyhow::bail!("concurrency limits must be at least 1");
        }
        Ok(())
    }

    /// Circuit reset timeout as a duration
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.reset_timeout_secs)
    }

    /// Throttle floor as a duration
    pub fn throttle_floor(&self) -> Duration {
        Duration::from_millis(self.throttle_floor_ms)
    }

    /// Throttle ceiling as a duration
    pub fn throttle_ceiling(&self) -> Duration {
        Duration::from_millis(self.throttle_ceiling_ms)
    }

    /// Remote call timeout as a duration
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            reset_timeout_secs: default_reset_timeout_secs(),
            throttle_floor_ms: default_throttle_floor_ms(),
            throttle_ceiling_ms: default_throttle_ceiling_ms(),
            remote_timeout_secs: default_remote_timeout_secs(),
            cache_capacity: default_cache_capacity(),
            local_concurrency: default_local_concurrency(),
            remote_concurrency: default_remote_concurrency(),
            remote_batch_sizes: default_remote_batch_sizes(),
            local_batch_sizes: default_local_batch_sizes(),
        }
    }
}

/// Batch sizes keyed by the average-length bucket of the inputs
///
/// Shorter average text means per-item call overhead dominates, so the
/// bucket sizes decrease monotonically with length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatchSizeTable {
    /// Average length under 100 characters
    pub short: usize,
    /// Average length under 200 characters
    pub medium: usize,
    /// Average length under 500 characters
    pub long: usize,
    /// Average length of 500 characters or more
    pub very_long: usize,
}

impl BatchSizeTable {
    /// Select the batch size for a given average input length
    pub fn select(&self, avg_length: usize) -> usize {
        let size = if avg_length < 100 {
            self.short
        } else if avg_length < 200 {
            self.medium
        } else if avg_length < 500 {
            self.long
        } else {
            self.very_long
        };
        size.max(1)
    }
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_reset_timeout_secs() -> u64 {
    60
}

fn default_throttle_floor_ms() -> u64 {
    100
}

fn default_throttle_ceiling_ms() -> u64 {
    1_000
}

fn default_remote_timeout_secs() -> u64 {
    30
}

fn default_cache_capacity() -> usize {
    1_000
}

fn default_local_concurrency() -> usize {
    num_cpus::get()
}

fn default_remote_concurrency() -> usize {
    4
}

fn default_remote_batch_sizes() -> BatchSizeTable {
    BatchSizeTable {
        short: 20,
        medium: 15,
        long: 10,
        very_long: 5,
    }
}

fn default_local_batch_sizes() -> BatchSizeTable {
    BatchSizeTable {
        short: 50,
        medium: 40,
        long: 25,
        very_long: 15,
    }
}
