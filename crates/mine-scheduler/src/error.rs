//! Error types for the mine scheduler

use thiserror::Error;

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, MinerError>;

/// Errors that can occur while scheduling block production
#[derive(Debug, Error)]
pub enum MinerError {
    /// The chain view could not supply the current head
    #[error("Chain view unavailable: {0}")]
    ChainView(String),

    /// The local candidate is not a deputy at the given height
    #[error("Not a deputy at height {height}")]
    NotDeputy {
        /// Height the rotation was resolved for
        height: u64,
    },

    /// Invalid scheduler configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The scheduler was already closed and cannot be restarted
    #[error("Scheduler is closed")]
    Closed,
}

impl MinerError {
    /// Check if the error is transient and resolved by the next
    /// scheduling round (head change or watchdog retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ChainView(_) | Self::NotDeputy { .. })
    }
}
