//! Protocol parameters fixed at genesis.

use crate::Address;
use serde::{Deserialize, Serialize};

/// Default seconds between consecutive proposer slots.
pub const DEFAULT_BLOCK_INTERVAL_SECS: u64 = 10;
/// Default gas budget for a single block.
pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 10_000_000;

/// Parameters governing block production and validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Seconds between consecutive proposer slots.
    pub block_interval_secs: u64,
    /// Gas budget for a single block.
    pub block_gas_limit: u64,
    /// Addresses authorized to propose blocks, in rotation order.
    pub authorities: Vec<Address>,
}

impl ChainParams {
    /// Whether `addr` belongs to the authority set.
    pub fn is_authority(&self, addr: &Address) -> bool {
        self.authorities.contains(addr)
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            block_interval_secs: DEFAULT_BLOCK_INTERVAL_SECS,
            block_gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
            authorities: Vec::new(),
        }
    }
}
