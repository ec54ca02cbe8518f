//! Checkpointed account and storage state.
//!
//! A [`StateCreator`] owns the committed base; every [`State`] it mints
//! layers a [`StackedMap`] of typed keys over that base. `new_checkpoint`
//! and `revert` nest to arbitrary depth; `commit` flushes the live overlay
//! entries back to the base and returns a digest of the committed state.

use crate::stackedmap::{DefaultGetter, StackedMap};
use meridian_crypto::blake2b_256;
use meridian_types::{Address, Amount, Hash};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// One overlay key per mutable state observable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum StateKey {
    Balance(Address),
    Code(Address),
    CodeHash(Address),
    Storage(Address, Hash),
    Exists(Address),
}

#[derive(Clone, Debug)]
enum StateEntry {
    Balance(Amount),
    Code(Arc<Vec<u8>>),
    CodeHash(Hash),
    Storage(Hash),
    Exists(bool),
}

#[derive(Clone, Default)]
struct Account {
    balance: Amount,
    code: Arc<Vec<u8>>,
    code_hash: Hash,
}

#[derive(Default)]
struct CommittedBase {
    accounts: HashMap<Address, Account>,
    storage: HashMap<(Address, Hash), Hash>,
}

/// Mints [`State`] instances over a shared committed base.
#[derive(Clone, Default)]
pub struct StateCreator {
    base: Arc<RwLock<CommittedBase>>,
}

impl StateCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh `State` view over the committed base.
    pub fn state(&self) -> State {
        State::new(self.base.clone())
    }
}

/// A mutable, checkpointable view over the committed account state.
///
/// Single-threaded by construction: one `State` per block build or VM
/// invocation.
pub struct State {
    base: Arc<RwLock<CommittedBase>>,
    overlay: StackedMap<StateKey, StateEntry>,
}

impl State {
    fn new(base: Arc<RwLock<CommittedBase>>) -> Self {
        let reader = base.clone();
        let getter: DefaultGetter<StateKey, StateEntry> = Box::new(move |key| {
            let base = reader.read();
            Some(match key {
                StateKey::Balance(addr) => StateEntry::Balance(
                    base.accounts
                        .get(addr)
                        .map(|a| a.balance)
                        .unwrap_or(Amount::ZERO),
                ),
                StateKey::Code(addr) => StateEntry::Code(
                    base.accounts
                        .get(addr)
                        .map(|a| a.code.clone())
                        .unwrap_or_default(),
                ),
                StateKey::CodeHash(addr) => StateEntry::CodeHash(
                    base.accounts
                        .get(addr)
                        .map(|a| a.code_hash)
                        .unwrap_or(Hash::ZERO),
                ),
                StateKey::Storage(addr, key) => StateEntry::Storage(
                    base.storage
                        .get(&(*addr, *key))
                        .copied()
                        .unwrap_or(Hash::ZERO),
                ),
                StateKey::Exists(addr) => StateEntry::Exists(base.accounts.contains_key(addr)),
            })
        });
        Self {
            base,
            overlay: StackedMap::new(getter),
        }
    }

    pub fn balance(&self, addr: Address) -> Amount {
        match self.overlay.get(&StateKey::Balance(addr)) {
            StateEntry::Balance(v) => v,
            _ => unreachable!("balance key yields balance entry"),
        }
    }

    /// Set an account balance, creating the account if needed.
    pub fn set_balance(&mut self, addr: Address, amount: Amount) {
        self.overlay
            .put(StateKey::Balance(addr), StateEntry::Balance(amount));
        self.overlay
            .put(StateKey::Exists(addr), StateEntry::Exists(true));
    }

    pub fn code(&self, addr: Address) -> Arc<Vec<u8>> {
        match self.overlay.get(&StateKey::Code(addr)) {
            StateEntry::Code(v) => v,
            _ => unreachable!("code key yields code entry"),
        }
    }

    pub fn code_hash(&self, addr: Address) -> Hash {
        match self.overlay.get(&StateKey::CodeHash(addr)) {
            StateEntry::CodeHash(v) => v,
            _ => unreachable!("code-hash key yields code-hash entry"),
        }
    }

    /// Set contract code, creating the account if needed.
    pub fn set_code(&mut self, addr: Address, code: Vec<u8>) {
        let hash = Hash::new(blake2b_256(&code));
        self.overlay
            .put(StateKey::Code(addr), StateEntry::Code(Arc::new(code)));
        self.overlay
            .put(StateKey::CodeHash(addr), StateEntry::CodeHash(hash));
        self.overlay
            .put(StateKey::Exists(addr), StateEntry::Exists(true));
    }

    pub fn storage(&self, addr: Address, key: Hash) -> Hash {
        match self.overlay.get(&StateKey::Storage(addr, key)) {
            StateEntry::Storage(v) => v,
            _ => unreachable!("storage key yields storage entry"),
        }
    }

    pub fn set_storage(&mut self, addr: Address, key: Hash, value: Hash) {
        self.overlay
            .put(StateKey::Storage(addr, key), StateEntry::Storage(value));
    }

    pub fn exists(&self, addr: Address) -> bool {
        match self.overlay.get(&StateKey::Exists(addr)) {
            StateEntry::Exists(v) => v,
            _ => unreachable!("exists key yields exists entry"),
        }
    }

    /// Delete an account: identity, balance, and code are gone. Reverting
    /// past this point restores the account.
    pub fn delete(&mut self, addr: Address) {
        self.overlay
            .put(StateKey::Exists(addr), StateEntry::Exists(false));
        self.overlay
            .put(StateKey::Balance(addr), StateEntry::Balance(Amount::ZERO));
        self.overlay
            .put(StateKey::Code(addr), StateEntry::Code(Arc::default()));
        self.overlay
            .put(StateKey::CodeHash(addr), StateEntry::CodeHash(Hash::ZERO));
    }

    /// Open a checkpoint. Returns the nesting depth.
    pub fn new_checkpoint(&mut self) -> usize {
        self.overlay.push()
    }

    /// Discard all writes since the most recent checkpoint.
    ///
    /// Panics when no checkpoint is outstanding.
    pub fn revert(&mut self) {
        let depth = self.overlay.depth();
        assert!(depth > 0, "revert without outstanding checkpoint");
        self.overlay.pop_to(depth - 1);
    }

    /// Visit the live storage of `addr`: committed entries overlaid with
    /// any pending writes, zero-valued slots omitted.
    pub fn for_each_storage<F>(&self, addr: Address, mut visit: F)
    where
        F: FnMut(&Hash, &Hash) -> bool,
    {
        let mut merged: HashMap<Hash, Hash> = {
            let base = self.base.read();
            base.storage
                .iter()
                .filter(|((a, _), _)| *a == addr)
                .map(|((_, k), v)| (*k, *v))
                .collect()
        };
        self.overlay.journal(|key, value| {
            if let (StateKey::Storage(a, k), StateEntry::Storage(v)) = (key, value) {
                if *a == addr {
                    merged.insert(*k, *v);
                }
            }
            true
        });
        for (key, value) in &merged {
            if value.is_zero() {
                continue;
            }
            if !visit(key, value) {
                return;
            }
        }
    }

    /// Flush the live overlay entries into the committed base and return a
    /// digest of the committed state.
    pub fn commit(&mut self) -> Hash {
        let mut ops = Vec::new();
        self.overlay.journal(|key, value| {
            ops.push((key.clone(), value.clone()));
            true
        });

        let mut base = self.base.write();
        // Account data first; existence flags last so a deletion removes
        // the account even when other keys were journaled after it.
        for (key, value) in &ops {
            match (key, value) {
                (StateKey::Balance(addr), StateEntry::Balance(v)) => {
                    base.accounts.entry(*addr).or_default().balance = *v;
                }
                (StateKey::Code(addr), StateEntry::Code(v)) => {
                    base.accounts.entry(*addr).or_default().code = v.clone();
                }
                (StateKey::CodeHash(addr), StateEntry::CodeHash(v)) => {
                    base.accounts.entry(*addr).or_default().code_hash = *v;
                }
                (StateKey::Storage(addr, k), StateEntry::Storage(v)) => {
                    if v.is_zero() {
                        base.storage.remove(&(*addr, *k));
                    } else {
                        base.storage.insert((*addr, *k), *v);
                    }
                }
                (StateKey::Exists(_), _) => {}
                _ => unreachable!("state key paired with mismatched entry"),
            }
        }
        for (key, value) in &ops {
            if let (StateKey::Exists(addr), StateEntry::Exists(exists)) = (key, value) {
                if *exists {
                    base.accounts.entry(*addr).or_default();
                } else {
                    base.accounts.remove(addr);
                    base.storage.retain(|(a, _), _| a != addr);
                }
            }
        }
        digest(&base)
    }
}

/// Deterministic digest over the committed base: accounts and storage in
/// sorted order.
fn digest(base: &CommittedBase) -> Hash {
    let mut accounts: Vec<_> = base.accounts.iter().collect();
    accounts.sort_by_key(|(addr, _)| **addr);
    let mut storage: Vec<_> = base.storage.iter().collect();
    storage.sort_by_key(|(slot, _)| **slot);

    let mut data = Vec::new();
    for (addr, account) in accounts {
        data.extend_from_slice(addr.as_bytes());
        data.extend_from_slice(&account.balance.to_be_bytes());
        data.extend_from_slice(account.code_hash.as_bytes());
    }
    for ((addr, key), value) in storage {
        data.extend_from_slice(addr.as_bytes());
        data.extend_from_slice(key.as_bytes());
        data.extend_from_slice(value.as_bytes());
    }
    Hash::new(blake2b_256(&data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn key(n: u8) -> Hash {
        Hash::new([n; 32])
    }

    #[test]
    fn fresh_state_reads_defaults() {
        let creator = StateCreator::new();
        let state = creator.state();
        assert_eq!(state.balance(addr(1)), Amount::ZERO);
        assert!(!state.exists(addr(1)));
        assert!(state.code(addr(1)).is_empty());
        assert_eq!(state.storage(addr(1), key(1)), Hash::ZERO);
    }

    #[test]
    fn set_balance_creates_account() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(addr(1), Amount::from_u64(100));
        assert!(state.exists(addr(1)));
        assert_eq!(state.balance(addr(1)), Amount::from_u64(100));
    }

    #[test]
    fn checkpoint_revert_restores_reads() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(addr(1), Amount::from_u64(100));
        state.new_checkpoint();
        state.set_balance(addr(1), Amount::from_u64(5));
        state.set_storage(addr(1), key(2), key(9));
        state.revert();
        assert_eq!(state.balance(addr(1)), Amount::from_u64(100));
        assert_eq!(state.storage(addr(1), key(2)), Hash::ZERO);
    }

    #[test]
    fn nested_checkpoints_revert_in_order() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(addr(1), Amount::from_u64(1));
        state.new_checkpoint();
        state.set_balance(addr(1), Amount::from_u64(2));
        state.new_checkpoint();
        state.set_balance(addr(1), Amount::from_u64(3));
        state.revert();
        assert_eq!(state.balance(addr(1)), Amount::from_u64(2));
        state.revert();
        assert_eq!(state.balance(addr(1)), Amount::from_u64(1));
    }

    #[test]
    #[should_panic(expected = "revert without outstanding checkpoint")]
    fn revert_underflow_panics() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.revert();
    }

    #[test]
    fn commit_persists_across_states() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(addr(1), Amount::from_u64(77));
        state.set_storage(addr(1), key(1), key(2));
        state.commit();

        let fresh = creator.state();
        assert_eq!(fresh.balance(addr(1)), Amount::from_u64(77));
        assert_eq!(fresh.storage(addr(1), key(1)), key(2));
    }

    #[test]
    fn uncommitted_writes_do_not_leak() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(addr(1), Amount::from_u64(77));
        drop(state);
        assert_eq!(creator.state().balance(addr(1)), Amount::ZERO);
    }

    #[test]
    fn deletion_survives_commit() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_balance(addr(1), Amount::from_u64(10));
        state.commit();

        let mut state = creator.state();
        state.delete(addr(1));
        state.commit();

        let fresh = creator.state();
        assert!(!fresh.exists(addr(1)));
        assert_eq!(fresh.balance(addr(1)), Amount::ZERO);
    }

    #[test]
    fn set_code_tracks_hash() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_code(addr(1), vec![0x60, 0x60]);
        assert_eq!(*state.code(addr(1)), vec![0x60, 0x60]);
        assert!(!state.code_hash(addr(1)).is_zero());
        assert!(state.exists(addr(1)));
    }

    #[test]
    fn for_each_storage_merges_overlay() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        state.set_storage(addr(1), key(1), key(10));
        state.commit();

        let mut state = creator.state();
        state.set_storage(addr(1), key(2), key(20));
        state.set_storage(addr(1), key(1), Hash::ZERO); // cleared slot

        let mut slots = Vec::new();
        state.for_each_storage(addr(1), |k, v| {
            slots.push((*k, *v));
            true
        });
        assert_eq!(slots, vec![(key(2), key(20))]);
    }

    #[test]
    fn commit_digest_changes_with_state() {
        let creator = StateCreator::new();
        let mut state = creator.state();
        let empty = state.commit();
        state.set_balance(addr(1), Amount::from_u64(1));
        let funded = state.commit();
        assert_ne!(empty, funded);
    }
}
