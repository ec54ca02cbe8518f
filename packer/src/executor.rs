//! Minimal value-transfer executor.
//!
//! Stands in for the external VM interpreter on the packing path. It
//! drives the [`StateDb`] facade exactly the way the interpreter would:
//! snapshot, mutate balances, emit a transfer log, and revert the snapshot
//! when the transfer cannot be paid for.

use crate::error::PackError;
use meridian_chain::{Receipt, Transaction};
use meridian_state::{State, StateDb};
use meridian_types::{Address, Hash, Log};

/// Flat gas cost of a packable transaction.
pub const GAS_PER_TX: u64 = 21_000;

/// Topic 0 of the transfer log.
const TRANSFER_TOPIC: Hash = Hash::new(*b"meridian.transfer...............");

/// Execute one transaction against `state`, returning its receipt.
///
/// The facade lives for exactly this invocation; its journaled logs become
/// the receipt's logs.
pub fn execute(
    state: &mut State,
    tx: &Transaction,
    beneficiary: Address,
) -> Result<Receipt, PackError> {
    if tx.gas < GAS_PER_TX {
        return Err(PackError::IntrinsicGas {
            required: GAS_PER_TX,
            declared: tx.gas,
        });
    }
    let Some(recipient) = tx.recipient else {
        // contract creation belongs to the VM collaborator
        return Err(PackError::Unsupported);
    };

    let mut db = StateDb::new(state);
    let revision = db.snapshot();

    let fee = tx.gas_price.saturating_mul_gas(GAS_PER_TX);
    let cost = match tx.value.checked_add(fee) {
        Some(cost) if db.balance(tx.origin) >= cost => cost,
        _ => {
            db.revert_to_snapshot(revision);
            return Err(PackError::InsufficientBalance(tx.origin));
        }
    };

    db.sub_balance(tx.origin, cost);
    db.add_balance(recipient, tx.value);
    db.add_balance(beneficiary, fee);
    db.add_log(Log {
        address: recipient,
        topics: vec![
            TRANSFER_TOPIC,
            topic_from_address(tx.origin),
            topic_from_address(recipient),
        ],
        data: tx.value.to_be_bytes().to_vec(),
    });

    let mut logs = Vec::new();
    db.for_each_log(|log| {
        logs.push(log.clone());
        true
    });

    Ok(Receipt {
        tx_hash: tx.hash(),
        gas_used: GAS_PER_TX,
        logs,
    })
}

fn topic_from_address(addr: Address) -> Hash {
    let mut bytes = [0u8; 32];
    bytes[12..].copy_from_slice(addr.as_bytes());
    Hash::new(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_state::StateCreator;
    use meridian_types::Amount;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn transfer(from: u8, to: u8, value: u64, gas_price: u64) -> Transaction {
        Transaction {
            origin: addr(from),
            recipient: Some(addr(to)),
            value: Amount::from_u64(value),
            gas: GAS_PER_TX,
            gas_price: Amount::from_u64(gas_price),
            payload: Vec::new(),
        }
    }

    #[test]
    fn transfer_moves_value_and_fee() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(addr(1), Amount::from_u64(100_000));

        let receipt = execute(&mut state, &transfer(1, 2, 50_000, 1), addr(9)).unwrap();
        assert_eq!(receipt.gas_used, GAS_PER_TX);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(state.balance(addr(2)), Amount::from_u64(50_000));
        assert_eq!(state.balance(addr(9)), Amount::from_u64(GAS_PER_TX));
        assert_eq!(
            state.balance(addr(1)),
            Amount::from_u64(100_000 - 50_000 - GAS_PER_TX)
        );
    }

    #[test]
    fn insufficient_balance_leaves_state_untouched() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(addr(1), Amount::from_u64(10));

        let err = execute(&mut state, &transfer(1, 2, 50, 0), addr(9)).unwrap_err();
        assert!(matches!(err, PackError::InsufficientBalance(_)));
        assert_eq!(state.balance(addr(1)), Amount::from_u64(10));
        assert!(!state.exists(addr(2)));
    }

    #[test]
    fn underdeclared_gas_is_rejected() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        let mut tx = transfer(1, 2, 0, 0);
        tx.gas = 100;
        assert!(matches!(
            execute(&mut state, &tx, addr(9)),
            Err(PackError::IntrinsicGas { .. })
        ));
    }

    #[test]
    fn creation_transactions_are_not_packable() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        let mut tx = transfer(1, 2, 0, 0);
        tx.recipient = None;
        assert!(matches!(
            execute(&mut state, &tx, addr(9)),
            Err(PackError::Unsupported)
        ));
    }

    #[test]
    fn transfer_log_names_both_parties() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(addr(1), Amount::from_u64(100_000));

        let receipt = execute(&mut state, &transfer(1, 2, 1, 0), addr(9)).unwrap();
        let log = &receipt.logs[0];
        assert_eq!(log.address, addr(2));
        assert_eq!(log.topics.len(), 3);
        assert_eq!(log.topics[1], topic_from_address(addr(1)));
        assert_eq!(log.topics[2], topic_from_address(addr(2)));
    }
}
