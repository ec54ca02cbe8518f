//! Genesis block construction.
//!
//! The genesis block has no parent and no proposer: its parent id, signer
//! key, and signature are all zero, and its id is fully determined by the
//! timestamp, gas limit, and initial state root.

use crate::block::{Block, Header};
use meridian_types::{Address, BlockHash, Hash, PublicKey, Signature, Timestamp};

/// Build the genesis block for a chain whose initial state commits to
/// `state_root`.
pub fn build_genesis_block(timestamp: Timestamp, gas_limit: u64, state_root: Hash) -> Block {
    let header = Header {
        number: 0,
        parent_id: BlockHash::ZERO,
        timestamp,
        gas_limit,
        gas_used: 0,
        beneficiary: Address::ZERO,
        txs_root: Block::txs_root(&[]),
        state_root,
        signer: PublicKey([0u8; 32]),
        signature: Signature::ZERO,
    };
    Block::new(header, Vec::new())
}
