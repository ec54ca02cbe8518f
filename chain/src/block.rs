//! Blocks and headers.

use crate::transaction::Transaction;
use meridian_crypto::{address_from_public, blake2b_256_multi, verify_signature};
use meridian_types::{Address, BlockHash, Hash, PublicKey, Signature, Timestamp};
use serde::{Deserialize, Serialize};

/// Block header. Treated as immutable once signed; the signature covers
/// every other field, and the block id covers the signature too.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub number: u64,
    pub parent_id: BlockHash,
    pub timestamp: Timestamp,
    pub gas_limit: u64,
    pub gas_used: u64,
    /// Account credited with transaction fees.
    pub beneficiary: Address,
    /// Digest of the transaction list.
    pub txs_root: Hash,
    /// Digest of the committed state after executing this block.
    pub state_root: Hash,
    /// Public key of the proposer. Ed25519 has no signer recovery, so the
    /// key travels with the header; `signer_address` derives the identity.
    pub signer: PublicKey,
    pub signature: Signature,
}

impl Header {
    /// Digest covered by the proposer signature: every field but the
    /// signature itself.
    pub fn signing_hash(&self) -> Hash {
        Hash::new(blake2b_256_multi(&[
            &self.number.to_be_bytes(),
            self.parent_id.as_bytes(),
            &self.timestamp.as_secs().to_be_bytes(),
            &self.gas_limit.to_be_bytes(),
            &self.gas_used.to_be_bytes(),
            self.beneficiary.as_bytes(),
            self.txs_root.as_bytes(),
            self.state_root.as_bytes(),
            &self.signer.0,
        ]))
    }

    /// Block id: digest of the signing hash and the signature.
    pub fn id(&self) -> BlockHash {
        BlockHash::new(blake2b_256_multi(&[
            self.signing_hash().as_bytes(),
            &self.signature.0,
        ]))
    }

    /// Check the embedded proposer signature.
    pub fn verify_signature(&self) -> bool {
        verify_signature(self.signing_hash().as_bytes(), &self.signature, &self.signer)
    }

    /// Address of the proposer that signed this header.
    pub fn signer_address(&self) -> Address {
        address_from_public(&self.signer)
    }
}

/// A block: header plus transaction list. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn id(&self) -> BlockHash {
        self.header.id()
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> u64 {
        bincode::serialized_size(self).unwrap_or(0)
    }

    /// Digest of a transaction list, as committed in the header.
    pub fn txs_root(transactions: &[Transaction]) -> Hash {
        let hashes: Vec<[u8; 32]> = transactions.iter().map(|tx| *tx.hash().as_bytes()).collect();
        let parts: Vec<&[u8]> = hashes.iter().map(|h| h.as_slice()).collect();
        Hash::new(blake2b_256_multi(&parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_crypto::{keypair_from_seed, sign_message};
    use meridian_types::Amount;

    fn signed_header(number: u64, seed: u8) -> Header {
        let kp = keypair_from_seed(&[seed; 32]);
        let mut header = Header {
            number,
            parent_id: BlockHash::ZERO,
            timestamp: Timestamp::new(1000),
            gas_limit: 10_000_000,
            gas_used: 0,
            beneficiary: Address::ZERO,
            txs_root: Block::txs_root(&[]),
            state_root: Hash::ZERO,
            signer: kp.public.clone(),
            signature: Signature::ZERO,
        };
        header.signature = sign_message(header.signing_hash().as_bytes(), &kp.private);
        header
    }

    #[test]
    fn signature_verifies_after_signing() {
        let header = signed_header(1, 7);
        assert!(header.verify_signature());
    }

    #[test]
    fn tampering_invalidates_signature() {
        let mut header = signed_header(1, 7);
        header.number = 2;
        assert!(!header.verify_signature());
    }

    #[test]
    fn id_depends_on_signature() {
        let a = signed_header(1, 7);
        let b = signed_header(1, 8);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn id_is_deterministic() {
        let a = signed_header(3, 7);
        let b = signed_header(3, 7);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn block_size_is_positive() {
        let block = Block::new(signed_header(1, 7), Vec::new());
        assert!(block.size() > 0);
    }

    #[test]
    fn txs_root_commits_to_contents() {
        let tx = Transaction {
            origin: Address::new([1u8; 20]),
            recipient: Some(Address::new([2u8; 20])),
            value: Amount::from_u64(1),
            gas: 21_000,
            gas_price: Amount::ZERO,
            payload: Vec::new(),
        };
        assert_ne!(Block::txs_root(&[]), Block::txs_root(&[tx]));
    }
}
