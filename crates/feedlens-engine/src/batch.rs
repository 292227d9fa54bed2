//! Size-adaptive batch planning
//!
//! Stateless: the planner inspects the average input length and carves
//! the inputs into contiguous batches whose size comes from the
//! configured bucket table. Each batch keeps the original request
//! indices of its members so results scatter back correctly regardless
//! of completion order.

use crate::config::BatchSizeTable;
use feedlens_core::Batch;

/// Partitions request inputs into batches for remote or local dispatch
#[derive(Debug, Clone, Copy)]
pub struct BatchPlanner {
    remote_sizes: BatchSizeTable,
    local_sizes: BatchSizeTable,
}

impl BatchPlanner {
    /// Create a planner from the configured size tables
    pub fn new(remote_sizes: BatchSizeTable, local_sizes: BatchSizeTable) -> Self {
        Self {
            remote_sizes,
            local_sizes,
        }
    }

    /// Plan batches for remote dispatch
    pub fn plan_remote(&self, items: &[(usize, String)]) -> Vec<Batch> {
        Self::plan(items, &self.remote_sizes)
    }

    /// Plan batches for local analysis (larger: no quota cost)
    pub fn plan_local(&self, items: &[(usize, String)]) -> Vec<Batch> {
        Self::plan(items, &self.local_sizes)
    }

    fn plan(items: &[(usize, String)], table: &BatchSizeTable) -> Vec<Batch> {
        if items.is_empty() {
            return Vec::new();
        }

        let total_chars: usize = items.iter().map(|(_, text)| text.chars().count()).sum();
        let avg_length = total_chars / items.len();
        let batch_size = table.select(avg_length);

        items
            .chunks(batch_size)
            .map(|chunk| Batch {
                original_indices: chunk.iter().map(|(index, _)| *index).collect(),
                texts: chunk.iter().map(|(_, text)| text.clone()).collect(),
            })
            .collect()
    }
}
