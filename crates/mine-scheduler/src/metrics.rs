//! Metrics collection for the mine scheduler

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracking scheduling activity
///
/// All counters are relaxed atomics so they can be read from outside
/// the event loop without synchronization.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Production requests handed to the block assembler
    pub blocks_requested: AtomicU64,

    /// Watchdog fires (production attempts presumed failed)
    pub watchdog_retries: AtomicU64,

    /// Schedule recomputations triggered by a new head
    pub head_reschedules: AtomicU64,

    /// Scheduling rounds skipped because the node was not a deputy
    pub non_deputy_rounds: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a production request
    pub fn record_block_requested(&self) {
        self.blocks_requested.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a watchdog retry
    pub fn record_watchdog_retry(&self) {
        self.watchdog_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reschedule caused by a new head
    pub fn record_head_reschedule(&self) {
        self.head_reschedules.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a round skipped as non-deputy
    pub fn record_non_deputy_round(&self) {
        self.non_deputy_rounds.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total production requests
    pub fn get_blocks_requested(&self) -> u64 {
        self.blocks_requested.load(Ordering::Relaxed)
    }

    /// Get total watchdog retries
    pub fn get_watchdog_retries(&self) -> u64 {
        self.watchdog_retries.load(Ordering::Relaxed)
    }

    /// Get total head-triggered reschedules
    pub fn get_head_reschedules(&self) -> u64 {
        self.head_reschedules.load(Ordering::Relaxed)
    }

    /// Get total rounds skipped as non-deputy
    pub fn get_non_deputy_rounds(&self) -> u64 {
        self.non_deputy_rounds.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = Metrics::new();

        metrics.record_block_requested();
        metrics.record_block_requested();
        metrics.record_watchdog_retry();
        metrics.record_head_reschedule();

        assert_eq!(metrics.get_blocks_requested(), 2);
        assert_eq!(metrics.get_watchdog_retries(), 1);
        assert_eq!(metrics.get_head_reschedules(), 1);
        assert_eq!(metrics.get_non_deputy_rounds(), 0);
    }
}
