//! Candidate block validation and fork choice.

use crate::error::ConsensusError;
use crate::schedule;
use meridian_chain::{Block, Chain, Header};
use meridian_types::{ChainParams, Timestamp};
use std::sync::Arc;

/// Stateless block validator bound to the chain store and the protocol
/// parameters.
pub struct Consenter {
    chain: Arc<Chain>,
    params: ChainParams,
}

impl Consenter {
    pub fn new(chain: Arc<Chain>, params: ChainParams) -> Self {
        Self { chain, params }
    }

    /// Validate a candidate block received from the network.
    ///
    /// On acceptance, returns whether the block extends the trunk. The
    /// caller appends the block and (when on trunk) rebroadcasts it.
    pub fn consent(&self, block: &Block, now: Timestamp) -> Result<bool, ConsensusError> {
        let header = &block.header;
        let parent = self
            .chain
            .get_header(&header.parent_id)
            .map_err(|_| ConsensusError::UnknownParent(header.parent_id))?;

        if header.number != parent.number + 1 {
            return Err(ConsensusError::InvalidNumber {
                expected: parent.number + 1,
                actual: header.number,
            });
        }
        if header.timestamp > now {
            return Err(ConsensusError::TimestampInFuture);
        }
        if header.gas_limit != self.params.block_gas_limit {
            return Err(ConsensusError::InvalidGasLimit {
                expected: self.params.block_gas_limit,
                actual: header.gas_limit,
            });
        }
        if header.gas_used > header.gas_limit {
            return Err(ConsensusError::GasUsedExceedsLimit);
        }
        if Block::txs_root(&block.transactions) != header.txs_root {
            return Err(ConsensusError::InvalidTxsRoot);
        }
        if !header.verify_signature() {
            return Err(ConsensusError::InvalidSignature);
        }

        let signer = header.signer_address();
        let scheduled = schedule::proposer_for(&parent, header.timestamp, &self.params)
            .ok_or(ConsensusError::TimestampOffSlot)?;
        if scheduled != signer {
            return Err(ConsensusError::UnauthorizedProposer(signer));
        }

        self.is_trunk(header)
    }

    /// Fork choice for an already-validated header: does it become the new
    /// chain head? Higher number wins; equal numbers break toward the
    /// lower block id.
    ///
    /// Used directly for locally packed blocks, which skip re-validation.
    pub fn is_trunk(&self, header: &Header) -> Result<bool, ConsensusError> {
        // the parent must still be present; a packed block can lose it to
        // a concurrent reorg
        self.chain
            .get_header(&header.parent_id)
            .map_err(|_| ConsensusError::UnknownParent(header.parent_id))?;
        let best = self
            .chain
            .get_best_block()
            .map_err(|_| ConsensusError::NoBestBlock)?;
        let best = &best.header;
        Ok(header.number > best.number
            || (header.number == best.number && header.id() < best.id()))
    }
}
