//! Contract log events.

use crate::{Address, Hash};
use serde::{Deserialize, Serialize};

/// A log record produced by the LOG opcode during transaction execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Address of the contract that generated the event.
    pub address: Address,
    /// Topics provided by the contract.
    pub topics: Vec<Hash>,
    /// Payload supplied by the contract, usually ABI-encoded.
    pub data: Vec<u8>,
}
