use meridian_types::{Address, BlockHash};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("parent block {0} unknown")]
    UnknownParent(BlockHash),

    #[error("block number {actual}, expected {expected}")]
    InvalidNumber { expected: u64, actual: u64 },

    #[error("timestamp not on a proposer slot")]
    TimestampOffSlot,

    #[error("block timestamp is in the future")]
    TimestampInFuture,

    #[error("gas limit {actual}, expected {expected}")]
    InvalidGasLimit { expected: u64, actual: u64 },

    #[error("gas used exceeds gas limit")]
    GasUsedExceedsLimit,

    #[error("transaction root does not match block body")]
    InvalidTxsRoot,

    #[error("proposer signature is invalid")]
    InvalidSignature,

    #[error("proposer {0} not scheduled for this slot")]
    UnauthorizedProposer(Address),

    #[error("chain has no best block")]
    NoBestBlock,
}
