//! # Mine Scheduler - Deputy Rotation Block Production
//!
//! Decides **when** this node, as one of a fixed rotating set of
//! authorized producers ("deputies"), must attempt to produce the next
//! block, and recovers automatically when a production attempt fails or
//! is superseded by a block received from the network.
//!
//! ## Key Design Principles
//!
//! 1. **Single event loop**: one task owns all timer state and
//!    serializes every transition; external stimuli arrive as messages
//! 2. **One re-synchronization point**: every adopted block, whether
//!    self-produced or peer-received, cancels all timers and recomputes
//!    the schedule from the new head
//! 3. **Self-healing retry**: a watchdog re-arms scheduling when a
//!    production request yields no observable block within one slot
//! 4. **Lock-free control surface**: start/stop/is-mining ride on a
//!    compare-and-swapped tri-state flag, never a mutex
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports                                              │
//! │  - Inbound:  MineControl (node lifecycle)           │
//! │  - Outbound: ChainView, RotationResolver,           │
//! │              BlockAssembler                         │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Scheduler (event loop, timers, watchdog)           │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (pure logic)                                │
//! │  - Window calculator (rotation geometry → wait)     │
//! │  - Chain entities                                   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`domain`]: Pure scheduling logic (window arithmetic, entities)
//! - [`ports`]: Hexagonal architecture interfaces (inbound/outbound)
//! - [`scheduler`]: The event loop and lifecycle implementation

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Pure domain logic
pub mod domain;
/// Port interfaces
pub mod ports;
/// Scheduler service
pub mod scheduler;

mod config;
mod error;
mod metrics;

pub use config::MinerConfig;
pub use error::{MinerError, Result};
pub use metrics::Metrics;

// Re-export commonly used types
pub use domain::{sleep_time, Address, Block, WindowParams};
pub use ports::{
    BlockAssembler, ChainView, MineControl, ProduceRequest, RotationResolver, StartStatus,
    StopStatus,
};
pub use scheduler::MineScheduler;

/// Default minimum spacing between consecutive blocks (milliseconds)
pub const DEFAULT_BLOCK_INTERVAL_MS: u64 = 3_000;

/// Default duration of one deputy's production slot (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Maximum length of the extra data embedded in produced blocks (bytes)
pub const MAX_EXTRA_DATA_LEN: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_BLOCK_INTERVAL_MS, 3_000);
        assert_eq!(DEFAULT_TIMEOUT_MS, 10_000);
        assert_eq!(MAX_EXTRA_DATA_LEN, 256);
        assert!(DEFAULT_BLOCK_INTERVAL_MS < DEFAULT_TIMEOUT_MS);
    }
}
