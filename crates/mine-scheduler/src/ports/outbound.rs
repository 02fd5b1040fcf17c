//! Outbound ports (driven side - SPI)
//!
//! The three external collaborators the scheduler depends on. All of
//! them are independently thread-safe services; the scheduler never
//! assumes exclusive access, so several schedulers (e.g. in tests) may
//! share one instance as long as each holds its own subscription.

use crate::domain::{Address, Block};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Port: Observe the local chain
#[async_trait]
pub trait ChainView: Send + Sync {
    /// Get the current head block
    async fn current_head(&self) -> Result<Block>;

    /// Subscribe to every block adopted as the new local head
    ///
    /// Self-produced and peer-received blocks arrive on the same feed.
    /// Dropping the receiver ends the subscription.
    fn subscribe_new_blocks(&self) -> broadcast::Receiver<Block>;
}

/// Port: Resolve the local node's rank in the deputy rotation
///
/// Read-only access to the process-wide deputy-set registry. Injected
/// rather than global so the scheduler stays testable in isolation.
#[async_trait]
pub trait RotationResolver: Send + Sync {
    /// Rank-distance of `candidate` at `height`, given the parent
    /// block's producer (1 = immediately next in line)
    ///
    /// Fails with [`MinerError::NotDeputy`] when the candidate is not
    /// a deputy at that height.
    ///
    /// [`MinerError::NotDeputy`]: crate::MinerError::NotDeputy
    async fn distance_of(
        &self,
        height: u64,
        parent_producer: Address,
        candidate: Address,
    ) -> Result<u64>;

    /// Number of deputies authorized to produce at `height`
    async fn deputy_count(&self, height: u64) -> u64;
}

/// Port: Ask the block assembly service for a new block
#[async_trait]
pub trait BlockAssembler: Send + Sync {
    /// Request assembly and sealing of a new block
    ///
    /// Fire-and-forget: the scheduler never observes the outcome
    /// directly, only through the new-block feed of the chain view.
    async fn request_block(&self, request: ProduceRequest);
}

/// A block production request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProduceRequest {
    /// Opaque extra data to embed in the block header (bounded length,
    /// validated by the assembler)
    pub extra_data: Vec<u8>,

    /// How long the assembler may spend building and sealing before the
    /// slot must be handed over to propagation (milliseconds)
    pub time_budget_ms: u64,
}
