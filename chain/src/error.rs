use meridian_types::BlockHash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("block {0} not found")]
    NotFound(BlockHash),

    #[error("block {0} already in chain")]
    Duplicate(BlockHash),

    #[error("parent {0} not in chain")]
    UnknownParent(BlockHash),

    #[error("genesis block already written")]
    GenesisAlreadyWritten,

    #[error("chain has no genesis block")]
    NoGenesis,
}

impl ChainError {
    /// Whether this error is the absence sentinel from a lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
