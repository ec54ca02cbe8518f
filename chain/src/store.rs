//! In-memory chain store with a designated best (trunk head) block.
//!
//! Append-only: blocks are keyed by id and never removed. Side branches
//! are retained; only trunk additions advance the best pointer. The store
//! is internally synchronized and safe to share across the lifecycle
//! loops (the consent loop is the only writer by construction).

use crate::block::{Block, Header};
use crate::error::ChainError;
use meridian_types::BlockHash;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

struct ChainInner {
    blocks: HashMap<BlockHash, Arc<Block>>,
    best: BlockHash,
    genesis: BlockHash,
}

/// The canonical chain plus all known side branches.
pub struct Chain {
    inner: RwLock<ChainInner>,
}

impl Chain {
    /// An empty chain. Unusable until [`Chain::write_genesis`] runs.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ChainInner {
                blocks: HashMap::new(),
                best: BlockHash::ZERO,
                genesis: BlockHash::ZERO,
            }),
        }
    }

    /// Install the genesis block as both root and best.
    pub fn write_genesis(&self, block: Block) -> Result<(), ChainError> {
        let mut inner = self.inner.write();
        if !inner.blocks.is_empty() {
            return Err(ChainError::GenesisAlreadyWritten);
        }
        let id = block.id();
        inner.blocks.insert(id, Arc::new(block));
        inner.best = id;
        inner.genesis = id;
        Ok(())
    }

    /// Header of the block with the given id, or the NotFound sentinel.
    pub fn get_header(&self, id: &BlockHash) -> Result<Header, ChainError> {
        self.get_block(id).map(|b| b.header.clone())
    }

    pub fn get_block(&self, id: &BlockHash) -> Result<Arc<Block>, ChainError> {
        self.inner
            .read()
            .blocks
            .get(id)
            .cloned()
            .ok_or(ChainError::NotFound(*id))
    }

    /// The block the best pointer designates.
    pub fn get_best_block(&self) -> Result<Arc<Block>, ChainError> {
        let inner = self.inner.read();
        inner
            .blocks
            .get(&inner.best)
            .cloned()
            .ok_or(ChainError::NoGenesis)
    }

    pub fn genesis_id(&self) -> BlockHash {
        self.inner.read().genesis
    }

    /// Append a block. `on_trunk` advances the best pointer.
    ///
    /// At most one block per id: appending a known id fails, as does
    /// appending before genesis or with an unknown parent.
    pub fn add_block(&self, block: Arc<Block>, on_trunk: bool) -> Result<(), ChainError> {
        let mut inner = self.inner.write();
        if inner.blocks.is_empty() {
            return Err(ChainError::NoGenesis);
        }
        let id = block.id();
        if inner.blocks.contains_key(&id) {
            return Err(ChainError::Duplicate(id));
        }
        if !inner.blocks.contains_key(&block.header.parent_id) {
            return Err(ChainError::UnknownParent(block.header.parent_id));
        }
        inner.blocks.insert(id, block);
        if on_trunk {
            inner.best = id;
        }
        Ok(())
    }

    /// Total number of stored blocks, side branches included.
    pub fn block_count(&self) -> usize {
        self.inner.read().blocks.len()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::build_genesis_block;
    use meridian_crypto::{keypair_from_seed, sign_message};
    use meridian_types::{Address, Hash, Signature, Timestamp};

    fn genesis() -> Block {
        build_genesis_block(Timestamp::new(1000), 10_000_000, Hash::ZERO)
    }

    fn child_of(parent: &Header, seed: u8) -> Arc<Block> {
        let kp = keypair_from_seed(&[seed; 32]);
        let mut header = Header {
            number: parent.number + 1,
            parent_id: parent.id(),
            timestamp: parent.timestamp.add_secs(10),
            gas_limit: parent.gas_limit,
            gas_used: 0,
            beneficiary: Address::ZERO,
            txs_root: Block::txs_root(&[]),
            state_root: Hash::ZERO,
            signer: kp.public.clone(),
            signature: Signature::ZERO,
        };
        header.signature = sign_message(header.signing_hash().as_bytes(), &kp.private);
        Arc::new(Block::new(header, Vec::new()))
    }

    #[test]
    fn genesis_becomes_best() {
        let chain = Chain::new();
        let genesis = genesis();
        let id = genesis.id();
        chain.write_genesis(genesis).unwrap();
        assert_eq!(chain.get_best_block().unwrap().id(), id);
        assert_eq!(chain.genesis_id(), id);
    }

    #[test]
    fn double_genesis_rejected() {
        let chain = Chain::new();
        chain.write_genesis(genesis()).unwrap();
        assert!(matches!(
            chain.write_genesis(genesis()),
            Err(ChainError::GenesisAlreadyWritten)
        ));
    }

    #[test]
    fn missing_block_yields_not_found() {
        let chain = Chain::new();
        chain.write_genesis(genesis()).unwrap();
        let missing = BlockHash::new([9u8; 32]);
        let err = chain.get_header(&missing).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn trunk_addition_moves_best_pointer() {
        let chain = Chain::new();
        chain.write_genesis(genesis()).unwrap();
        let parent = chain.get_best_block().unwrap();
        let child = child_of(&parent.header, 1);
        chain.add_block(child.clone(), true).unwrap();
        assert_eq!(chain.get_best_block().unwrap().id(), child.id());
    }

    #[test]
    fn branch_addition_keeps_best_pointer() {
        let chain = Chain::new();
        chain.write_genesis(genesis()).unwrap();
        let parent = chain.get_best_block().unwrap();
        let branch = child_of(&parent.header, 2);
        chain.add_block(branch.clone(), false).unwrap();
        assert_eq!(chain.get_best_block().unwrap().id(), parent.id());
        // the branch is still retrievable
        assert!(chain.get_header(&branch.id()).is_ok());
    }

    #[test]
    fn duplicate_id_rejected() {
        let chain = Chain::new();
        chain.write_genesis(genesis()).unwrap();
        let parent = chain.get_best_block().unwrap();
        let child = child_of(&parent.header, 1);
        chain.add_block(child.clone(), true).unwrap();
        assert!(matches!(
            chain.add_block(child, true),
            Err(ChainError::Duplicate(_))
        ));
        assert_eq!(chain.block_count(), 2);
    }

    #[test]
    fn unknown_parent_rejected() {
        let chain = Chain::new();
        chain.write_genesis(genesis()).unwrap();
        let orphan_parent = Header {
            number: 5,
            parent_id: BlockHash::new([8u8; 32]),
            ..genesis().header
        };
        let orphan = child_of(&orphan_parent, 3);
        assert!(matches!(
            chain.add_block(orphan, true),
            Err(ChainError::UnknownParent(_))
        ));
    }

    #[test]
    fn add_before_genesis_rejected() {
        let chain = Chain::new();
        let fake_parent = genesis();
        let child = child_of(&fake_parent.header, 1);
        assert!(matches!(
            chain.add_block(child, true),
            Err(ChainError::NoGenesis)
        ));
    }
}
