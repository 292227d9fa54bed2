//! Feedlens Engine
//!
//! Resilient orchestrator for a rate-limited, occasionally-unreliable
//! cloud text-analysis API.
//!
//! This crate provides:
//! - A multi-partition LRU result cache with hit/miss accounting
//! - A circuit breaker and an adaptive minimum-interval throttle
//! - Size-adaptive batch planning with order-preserving scatter
//! - Defensive parsing of semi-structured model output
//! - Silent fallback to the local lexicon analyzer, so callers always
//!   receive a full result sequence even when the remote API is down

pub mod batch;
pub mod cache;
pub mod circuit;
pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod remote;
pub mod throttle;

pub use batch::BatchPlanner;
pub use cache::{CacheStats, PartitionStats, ResultCache};
pub use circuit::{CircuitBreaker, CircuitState};
pub use config::{BatchSizeTable, EngineConfig};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use orchestrator::{EngineStatus, Orchestrator};
pub use parser::ResponseParser;
pub use remote::{HttpRemoteApi, RemoteAnalysisApi};
pub use throttle::{AdaptiveThrottle, RemoteOutcome};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::orchestrator::{EngineStatus, Orchestrator};
    pub use crate::remote::{HttpRemoteApi, RemoteAnalysisApi};
    pub use feedlens_core::prelude::*;
}
