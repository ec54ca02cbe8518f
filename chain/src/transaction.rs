//! Transactions and execution receipts.

use meridian_crypto::blake2b_256;
use meridian_types::{Address, Amount, Log, TxHash};
use serde::{Deserialize, Serialize};

/// A value-transfer or contract-call transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The account the value and fee are drawn from.
    pub origin: Address,
    /// Destination account. `None` marks a contract creation, which this
    /// node hands to the VM collaborator rather than packing itself.
    pub recipient: Option<Address>,
    /// Value moved from origin to recipient.
    pub value: Amount,
    /// Gas budget declared by the sender.
    pub gas: u64,
    /// Price per unit of gas, paid to the block beneficiary.
    pub gas_price: Amount,
    /// Call data.
    pub payload: Vec<u8>,
}

impl Transaction {
    /// Content hash identifying this transaction.
    pub fn hash(&self) -> TxHash {
        let bytes = bincode::serialize(self).expect("plain-data transaction always serializes");
        TxHash::new(blake2b_256(&bytes))
    }
}

/// Outcome of executing one transaction inside a packed block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}
