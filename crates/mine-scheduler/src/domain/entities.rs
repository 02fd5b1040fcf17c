//! Chain entities consumed by the scheduler
//!
//! The scheduler only needs a narrow view of a block: its height, the
//! address that produced it and the header timestamp. Everything else
//! (transactions, state roots, signatures) belongs to other subsystems.

use serde::{Deserialize, Serialize};

/// 20-byte account address
pub type Address = [u8; 20];

/// Head-of-chain view of a block
///
/// Carries exactly the header fields scheduling decisions depend on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height
    pub height: u64,

    /// Address of the deputy that produced this block
    pub producer: Address,

    /// Header timestamp (Unix epoch seconds)
    pub timestamp: u64,
}

impl Block {
    /// Create a new head view
    pub fn new(height: u64, producer: Address, timestamp: u64) -> Self {
        Self {
            height,
            producer,
            timestamp,
        }
    }

    /// Height the next block on top of this head will have
    pub fn next_height(&self) -> u64 {
        self.height + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_height() {
        let block = Block::new(41, [0xaa; 20], 1_700_000_000);
        assert_eq!(block.next_height(), 42);
    }

    #[test]
    fn test_block_equality() {
        let a = Block::new(1, [1; 20], 100);
        let b = Block::new(1, [1; 20], 100);
        assert_eq!(a, b);
        assert_ne!(a, Block::new(2, [1; 20], 100));
    }
}
