//! The packer: slot scheduling and single-use block builds.

use crate::error::PackError;
use crate::executor;
use meridian_chain::{Block, Header, Receipt, Transaction};
use meridian_consensus::schedule;
use meridian_crypto::{public_from_private, sign_message};
use meridian_state::{State, StateCreator};
use meridian_types::{Address, ChainParams, PrivateKey, Signature, Timestamp};

/// Assembles new blocks whenever this node's proposer slot comes up.
pub struct Packer {
    state: StateCreator,
    proposer: Address,
    beneficiary: Address,
    params: ChainParams,
}

impl Packer {
    pub fn new(
        state: StateCreator,
        proposer: Address,
        beneficiary: Address,
        params: ChainParams,
    ) -> Self {
        Self {
            state,
            proposer,
            beneficiary,
            params,
        }
    }

    /// Set up a block build on top of `parent`.
    ///
    /// Errors when this node has no scheduled slot (not an authority). On
    /// success the returned [`Preparation`] owns the in-progress block;
    /// dropping it discards the build with no side effects.
    pub fn prepare(&self, parent: &Header, now: Timestamp) -> Result<Preparation, PackError> {
        let slot_ts = schedule::next_slot(parent, self.proposer, now, &self.params)
            .ok_or(PackError::NotScheduled(self.proposer))?;
        Ok(Preparation {
            parent: parent.clone(),
            slot_ts,
            gas_limit: self.params.block_gas_limit,
            beneficiary: self.beneficiary,
            state: self.state.state(),
            gas_used: 0,
            transactions: Vec::new(),
            receipts: Vec::new(),
        })
    }
}

/// A single-use block build returned by [`Packer::prepare`].
pub struct Preparation {
    parent: Header,
    slot_ts: Timestamp,
    gas_limit: u64,
    beneficiary: Address,
    state: State,
    gas_used: u64,
    transactions: Vec<Transaction>,
    receipts: Vec<Receipt>,
}

impl Preparation {
    /// The absolute second at which this build's slot opens. Never earlier
    /// than the `now` passed to `prepare`.
    pub fn slot_ts(&self) -> Timestamp {
        self.slot_ts
    }

    /// Adopt one transaction into the in-progress block.
    ///
    /// [`PackError::GasLimitReached`] means no further transaction fits and
    /// adoption must stop; any other error rejects only this transaction.
    pub fn adopt(&mut self, tx: Transaction) -> Result<(), PackError> {
        if self.gas_used + executor::GAS_PER_TX > self.gas_limit {
            return Err(PackError::GasLimitReached);
        }
        let receipt = executor::execute(&mut self.state, &tx, self.beneficiary)?;
        self.gas_used += receipt.gas_used;
        self.transactions.push(tx);
        self.receipts.push(receipt);
        Ok(())
    }

    /// Commit the accumulated state, seal and sign the header, and return
    /// the finished block with its receipts.
    pub fn commit(mut self, key: &PrivateKey) -> Result<(Block, Vec<Receipt>), PackError> {
        let state_root = self.state.commit();
        let mut header = Header {
            number: self.parent.number + 1,
            parent_id: self.parent.id(),
            timestamp: self.slot_ts,
            gas_limit: self.gas_limit,
            gas_used: self.gas_used,
            beneficiary: self.beneficiary,
            txs_root: Block::txs_root(&self.transactions),
            state_root,
            signer: public_from_private(key),
            signature: Signature::ZERO,
        };
        header.signature = sign_message(header.signing_hash().as_bytes(), key);
        Ok((Block::new(header, self.transactions), self.receipts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::GAS_PER_TX;
    use meridian_chain::build_genesis_block;
    use meridian_crypto::{address_from_public, keypair_from_seed};
    use meridian_types::{Amount, Hash, KeyPair};

    const INTERVAL: u64 = 10;
    const GAS_LIMIT: u64 = 10_000_000;

    fn proposer_key() -> KeyPair {
        keypair_from_seed(&[1u8; 32])
    }

    fn single_authority_params() -> ChainParams {
        ChainParams {
            block_interval_secs: INTERVAL,
            block_gas_limit: GAS_LIMIT,
            authorities: vec![address_from_public(&proposer_key().public)],
        }
    }

    fn genesis_header() -> Header {
        build_genesis_block(Timestamp::new(1000), GAS_LIMIT, Hash::ZERO).header
    }

    fn transfer(value: u64) -> Transaction {
        Transaction {
            origin: address_from_public(&proposer_key().public),
            recipient: Some(Address::new([2u8; 20])),
            value: Amount::from_u64(value),
            gas: GAS_PER_TX,
            gas_price: Amount::ZERO,
            payload: Vec::new(),
        }
    }

    fn funded_packer() -> Packer {
        let kp = proposer_key();
        let me = address_from_public(&kp.public);
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(me, Amount::from_u64(1_000_000));
        state.commit();
        Packer::new(creator, me, me, single_authority_params())
    }

    #[test]
    fn prepare_rejects_non_authority() {
        let creator = StateCreator::new();
        let outsider = Address::new([9u8; 20]);
        let packer = Packer::new(creator, outsider, outsider, single_authority_params());
        assert!(matches!(
            packer.prepare(&genesis_header(), Timestamp::new(1000)),
            Err(PackError::NotScheduled(_))
        ));
    }

    #[test]
    fn prepared_slot_is_not_before_now() {
        let packer = funded_packer();
        let now = Timestamp::new(1004);
        let prep = packer.prepare(&genesis_header(), now).unwrap();
        assert!(prep.slot_ts() >= now);
        assert_eq!((prep.slot_ts().as_secs() - 1000) % INTERVAL, 0);
    }

    #[test]
    fn committed_block_links_parent_and_verifies() {
        let packer = funded_packer();
        let parent = genesis_header();
        let mut prep = packer.prepare(&parent, Timestamp::new(1000)).unwrap();
        prep.adopt(transfer(100)).unwrap();
        let (block, receipts) = prep.commit(&proposer_key().private).unwrap();

        assert_eq!(block.header.number, 1);
        assert_eq!(block.header.parent_id, parent.id());
        assert_eq!(block.header.gas_used, GAS_PER_TX);
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(receipts.len(), 1);
        assert!(block.header.verify_signature());
        assert_eq!(
            Block::txs_root(&block.transactions),
            block.header.txs_root
        );
    }

    #[test]
    fn adoption_stops_at_gas_limit() {
        let kp = proposer_key();
        let me = address_from_public(&kp.public);
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(me, Amount::from_u64(u64::MAX));
        state.commit();
        let params = ChainParams {
            // room for exactly two transactions
            block_gas_limit: 2 * GAS_PER_TX,
            ..single_authority_params()
        };
        let packer = Packer::new(creator, me, me, params);
        let mut prep = packer.prepare(&genesis_header(), Timestamp::new(1000)).unwrap();

        prep.adopt(transfer(1)).unwrap();
        prep.adopt(transfer(2)).unwrap();
        let err = prep.adopt(transfer(3)).unwrap_err();
        assert!(err.is_gas_limit_reached());
    }

    #[test]
    fn rejected_transaction_is_not_included() {
        let packer = funded_packer();
        let mut prep = packer.prepare(&genesis_header(), Timestamp::new(1000)).unwrap();

        // more value than the origin holds: rejected, build continues
        let err = prep.adopt(transfer(2_000_000)).unwrap_err();
        assert!(matches!(err, PackError::InsufficientBalance(_)));
        prep.adopt(transfer(100)).unwrap();

        let (block, _) = prep.commit(&proposer_key().private).unwrap();
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.transactions[0].value, Amount::from_u64(100));
    }

    #[test]
    fn dropping_preparation_discards_the_build() {
        let packer = funded_packer();
        let me = address_from_public(&proposer_key().public);
        {
            let mut prep = packer.prepare(&genesis_header(), Timestamp::new(1000)).unwrap();
            prep.adopt(transfer(500)).unwrap();
            // dropped without commit
        }
        assert_eq!(
            packer.state.state().balance(me),
            Amount::from_u64(1_000_000)
        );
    }

    #[test]
    fn commit_updates_shared_state() {
        let packer = funded_packer();
        let mut prep = packer.prepare(&genesis_header(), Timestamp::new(1000)).unwrap();
        prep.adopt(transfer(500)).unwrap();
        prep.commit(&proposer_key().private).unwrap();

        let recipient = Address::new([2u8; 20]);
        assert_eq!(
            packer.state.state().balance(recipient),
            Amount::from_u64(500)
        );
    }
}
