//! Multi-partition result cache with LRU eviction
//!
//! One independent partition per [`AnalysisKind`], so eviction pressure
//! from one analysis kind never displaces entries of another.

use feedlens_core::{AnalysisKind, AnalysisResult};
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Texts up to this many bytes are used as cache keys directly
const INLINE_KEY_MAX: usize = 1000;

/// Prefix length kept when deriving keys for oversized texts
const KEY_PREFIX_CHARS: usize = 100;

/// Bounded, partitioned cache for analysis results
pub struct ResultCache {
    capacity: usize,
    partitions: [Mutex<Partition>; 3],
}

#[derive(Default)]
struct Partition {
    entries: HashMap<String, CacheEntry>,
    /// Logical clock; bumped on every probe so recency is total-ordered
    tick: u64,
    hits: u64,
    misses: u64,
}

struct CacheEntry {
    value: AnalysisResult,
    last_access: u64,
}

impl ResultCache {
    /// Create a cache with the given per-partition capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            partitions: [
                Mutex::new(Partition::default()),
                Mutex::new(Partition::default()),
                Mutex::new(Partition::default()),
            ],
        }
    }

    /// Look up a cached result, refreshing its recency on hit
    pub fn get(&self, text: &str, kind: AnalysisKind) -> Option<AnalysisResult> {
        let key = Self::key_for(text);
        let mut guard = self.partition(kind).lock();
        let partition = &mut *guard;

        partition.tick += 1;
        let tick = partition.tick;

        match partition.entries.get_mut(&key) {
            Some(entry) => {
                entry.last_access = tick;
                partition.hits += 1;
                Some(entry.value.clone())
            }
            None => {
                partition.misses += 1;
                None
            }
        }
    }

    /// Insert a result, evicting the least-recently-accessed entry if the
    /// partition is over capacity
    pub fn put(&self, text: &str, value: AnalysisResult, kind: AnalysisKind) {
        let key = Self::key_for(text);
        let mut guard = self.partition(kind).lock();
        let partition = &mut *guard;

        partition.tick += 1;
        let tick = partition.tick;
        partition.entries.insert(
            key,
            CacheEntry {
                value,
                last_access: tick,
            },
        );

        while partition.entries.len() > self.capacity {
            let oldest = partition
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    partition.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Current hit/miss/size counters for every partition
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            sentiment: self.partition_stats(AnalysisKind::Sentiment),
            insight: self.partition_stats(AnalysisKind::Insight),
            summary: self.partition_stats(AnalysisKind::Summary),
        }
    }

    fn partition_stats(&self, kind: AnalysisKind) -> PartitionStats {
        let partition = self.partition(kind).lock();
        PartitionStats {
            hits: partition.hits,
            misses: partition.misses,
            size: partition.entries.len(),
        }
    }

    fn partition(&self, kind: AnalysisKind) -> &Mutex<Partition> {
        let index = match kind {
            AnalysisKind::Sentiment => 0,
            AnalysisKind::Insight => 1,
            AnalysisKind::Summary => 2,
        };
        &self.partitions[index]
    }

    /// Derive the cache key for a text
    ///
    /// Short texts key on themselves; oversized texts key on a bounded
    /// prefix plus a content hash so the key stays small while collisions
    /// stay out of practical reach.
    pub fn key_for(text: &str) -> String {
        if text.len() <= INLINE_KEY_MAX {
            return text.to_string();
        }

        let prefix_end = text
            .char_indices()
            .nth(KEY_PREFIX_CHARS)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let digest = Sha256::digest(text.as_bytes());
        format!("{}_{:x}", &text[..prefix_end], digest)
    }
}

/// Per-partition cache statistics
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PartitionStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// Statistics across all partitions
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheStats {
    pub sentiment: PartitionStats,
    pub insight: PartitionStats,
    pub summary: PartitionStats,
}

impl CacheStats {
    /// Stats for one partition
    pub fn for_kind(&self, kind: AnalysisKind) -> PartitionStats {
        match kind {
            AnalysisKind::Sentiment => self.sentiment,
            AnalysisKind::Insight => self.insight,
            AnalysisKind::Summary => self.summary,
        }
    }

    /// Hits summed across partitions
    pub fn total_hits(&self) -> u64 {
        self.sentiment.hits + self.insight.hits + self.summary.hits
    }

    /// Misses summed across partitions
    pub fn total_misses(&self) -> u64 {
        self.sentiment.misses + self.insight.misses + self.summary.misses
    }
}
