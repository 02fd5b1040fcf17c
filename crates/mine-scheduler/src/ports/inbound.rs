//! Inbound ports (driving side - API)

use crate::domain::Address;
use crate::error::Result;
use async_trait::async_trait;

/// Outcome of a start request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StartStatus {
    /// The scheduler transitioned from disabled to enabled
    Started,

    /// The scheduler was already enabled; the call was a no-op
    AlreadyRunning,
}

/// Outcome of a stop request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopStatus {
    /// The scheduler transitioned from enabled to disabled
    Stopped,

    /// The scheduler was not enabled; the call was a no-op
    AlreadyStopped,
}

/// Primary port: scheduler lifecycle control
///
/// All methods are safe to call concurrently from outside the event
/// loop; repeated start/stop calls are harmless no-ops per the status
/// return values.
#[async_trait]
pub trait MineControl: Send + Sync {
    /// Enable block production scheduling
    ///
    /// Errors only if the scheduler was closed or the very first head
    /// query fails, so the node startup sequence can abort.
    async fn start(&self) -> Result<StartStatus>;

    /// Disable scheduling, cancelling any armed timers before returning
    async fn stop(&self) -> StopStatus;

    /// Permanently tear the scheduler down; idempotent, not reversible
    async fn close(&self);

    /// True only while enabled and currently a deputy for the next height
    fn is_mining(&self) -> bool;

    /// Set the candidate address used in the next scheduling round
    fn set_miner_address(&self, address: Address);

    /// Get the candidate address used in the next scheduling round
    fn miner_address(&self) -> Address;
}
