//! VM-facing state facade.
//!
//! Adapts a checkpointed [`State`] plus an auxiliary journal into the
//! contract the VM consumes. Persistent account and storage mutations go
//! to the underlying state; VM-only data (suicide flags, the refund
//! counter, preimages, logs) lives in the journal so that it rolls back in
//! lockstep with the state at arbitrary snapshot depths.
//!
//! One facade per VM invocation; never shared across threads.

use crate::stackedmap::{DefaultGetter, StackedMap};
use crate::state::State;
use meridian_types::{Address, Amount, Hash, Log};
use std::sync::Arc;

/// Journal key: VM-only auxiliary data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum JournalKey {
    /// Suicide flag of an address.
    Suicide(Address),
    /// The single accumulated-refund counter.
    Refund,
    /// Recorded preimage of a hash.
    Preimage(Hash),
    /// A log entry under a fresh sequence number.
    Log(u64),
}

#[derive(Clone, Debug)]
enum JournalValue {
    Flag(bool),
    Counter(Amount),
    Bytes(Vec<u8>),
    Entry(Log),
}

/// The read/write/snapshot contract the VM executes against.
pub struct StateDb<'a> {
    state: &'a mut State,
    journal: StackedMap<JournalKey, JournalValue>,
    /// Next log sequence number. Monotonic, so log keys are unique and
    /// enumerate in insertion order.
    next_log: u64,
}

impl<'a> StateDb<'a> {
    pub fn new(state: &'a mut State) -> Self {
        let getter: DefaultGetter<JournalKey, JournalValue> = Box::new(|key| {
            Some(match key {
                JournalKey::Suicide(_) => JournalValue::Flag(false),
                JournalKey::Refund => JournalValue::Counter(Amount::ZERO),
                JournalKey::Preimage(_) => JournalValue::Bytes(Vec::new()),
                JournalKey::Log(_) => JournalValue::Entry(Log {
                    address: Address::ZERO,
                    topics: Vec::new(),
                    data: Vec::new(),
                }),
            })
        });
        Self {
            state,
            journal: StackedMap::new(getter),
            next_log: 0,
        }
    }

    // ── Reads (passthrough to the underlying state) ────────────────────

    pub fn balance(&self, addr: Address) -> Amount {
        self.state.balance(addr)
    }

    pub fn code_hash(&self, addr: Address) -> Hash {
        self.state.code_hash(addr)
    }

    pub fn code(&self, addr: Address) -> Arc<Vec<u8>> {
        self.state.code(addr)
    }

    pub fn code_size(&self, addr: Address) -> usize {
        self.state.code(addr).len()
    }

    pub fn storage(&self, addr: Address, key: Hash) -> Hash {
        self.state.storage(addr, key)
    }

    pub fn exists(&self, addr: Address) -> bool {
        self.state.exists(addr)
    }

    /// The VM conflates "empty" with "non-existent" at this layer.
    pub fn empty(&self, addr: Address) -> bool {
        !self.state.exists(addr)
    }

    // ── Writes ─────────────────────────────────────────────────────────

    pub fn set_code(&mut self, addr: Address, code: Vec<u8>) {
        self.state.set_code(addr, code);
    }

    pub fn set_storage(&mut self, addr: Address, key: Hash, value: Hash) {
        self.state.set_storage(addr, key, value);
    }

    pub fn add_balance(&mut self, addr: Address, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        let balance = self.state.balance(addr);
        self.state.set_balance(addr, balance.wrapping_add(amount));
    }

    /// Subtract without an underflow check: the difference is semantically
    /// signed, and the VM guarantees balances net out non-negative at
    /// commit boundaries.
    pub fn sub_balance(&mut self, addr: Address, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        let balance = self.state.balance(addr);
        self.state.set_balance(addr, balance.wrapping_sub(amount));
    }

    /// Accepted and ignored: this chain does not track nonces at the
    /// VM-facade layer.
    pub fn create_account(&mut self, _addr: Address) {}

    /// Accepted and ignored (see [`StateDb::create_account`]).
    pub fn set_nonce(&mut self, _addr: Address, _nonce: u64) {}

    /// Always zero (see [`StateDb::create_account`]).
    pub fn nonce(&self, _addr: Address) -> u64 {
        0
    }

    /// Delete the account and flag the address as suicided.
    ///
    /// Returns `false`, touching nothing, when the address does not exist.
    pub fn suicide(&mut self, addr: Address) -> bool {
        if !self.state.exists(addr) {
            return false;
        }
        self.state.delete(addr);
        self.journal
            .put(JournalKey::Suicide(addr), JournalValue::Flag(true));
        true
    }

    pub fn has_suicided(&self, addr: Address) -> bool {
        match self.journal.get(&JournalKey::Suicide(addr)) {
            JournalValue::Flag(v) => v,
            _ => unreachable!("suicide key yields flag"),
        }
    }

    // ── Auxiliary (journal-only) ───────────────────────────────────────

    pub fn add_refund(&mut self, amount: Amount) {
        let total = self.refund().saturating_add(amount);
        self.journal
            .put(JournalKey::Refund, JournalValue::Counter(total));
    }

    /// Total refund accumulated during this VM invocation.
    pub fn refund(&self) -> Amount {
        match self.journal.get(&JournalKey::Refund) {
            JournalValue::Counter(v) => v,
            _ => unreachable!("refund key yields counter"),
        }
    }

    pub fn add_preimage(&mut self, hash: Hash, preimage: Vec<u8>) {
        self.journal
            .put(JournalKey::Preimage(hash), JournalValue::Bytes(preimage));
    }

    /// Visit recorded preimages in insertion order; stop on `false`.
    pub fn for_each_preimage<F>(&self, mut visit: F)
    where
        F: FnMut(&Hash, &[u8]) -> bool,
    {
        self.journal.journal(|key, value| {
            if let (JournalKey::Preimage(hash), JournalValue::Bytes(bytes)) = (key, value) {
                visit(hash, bytes)
            } else {
                true
            }
        });
    }

    pub fn add_log(&mut self, log: Log) {
        let seq = self.next_log;
        self.next_log += 1;
        self.journal
            .put(JournalKey::Log(seq), JournalValue::Entry(log));
    }

    /// Visit collected logs in emission order; stop on `false`.
    pub fn for_each_log<F>(&self, mut visit: F)
    where
        F: FnMut(&Log) -> bool,
    {
        self.journal.journal(|key, value| {
            if let (JournalKey::Log(_), JournalValue::Entry(log)) = (key, value) {
                visit(log)
            } else {
                true
            }
        });
    }

    /// Visit live storage of `addr` in the underlying state. Storage writes
    /// are recorded below the facade, so the journal is not involved.
    pub fn for_each_storage<F>(&self, addr: Address, visit: F)
    where
        F: FnMut(&Hash, &Hash) -> bool,
    {
        self.state.for_each_storage(addr, visit);
    }

    // ── Snapshots ──────────────────────────────────────────────────────

    /// Checkpoint the underlying state and the journal together. The
    /// returned revision is a monotonically increasing one-shot handle.
    pub fn snapshot(&mut self) -> usize {
        self.state.new_checkpoint();
        self.journal.push()
    }

    /// Roll back to `revision`. State reverts precede journal pops so an
    /// interruption leaves the two sides consistent.
    ///
    /// Panics on a revision that was never issued (programmer error).
    pub fn revert_to_snapshot(&mut self, revision: usize) {
        let depth = self.journal.depth();
        assert!(
            revision <= depth,
            "invalid snapshot revision {revision} (depth {depth})"
        );
        for _ in 0..depth - revision {
            self.state.revert();
        }
        self.journal.pop_to(revision);
    }
}
