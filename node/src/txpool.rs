//! Pending transaction pool.
//!
//! Holds transactions submitted locally or relayed by peers until they are
//! packed. `pending()` snapshots the pool into a finite, non-restartable
//! iterator ordered by gas price (highest first, then arrival), which is
//! exactly what one pack attempt consumes.

use meridian_chain::{Block, Transaction};
use meridian_types::TxHash;
use parking_lot::Mutex;
use std::collections::HashSet;

struct PoolInner {
    txs: Vec<Transaction>,
    seen: HashSet<TxHash>,
}

/// Shared, internally synchronized transaction pool.
pub struct TxPool {
    inner: Mutex<PoolInner>,
}

impl TxPool {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                txs: Vec::new(),
                seen: HashSet::new(),
            }),
        }
    }

    /// Add a transaction. Returns `false` for a duplicate (by hash).
    pub fn submit(&self, tx: Transaction) -> bool {
        let mut inner = self.inner.lock();
        if !inner.seen.insert(tx.hash()) {
            return false;
        }
        inner.txs.push(tx);
        true
    }

    /// Snapshot the pool into a priority-ordered pending iterator.
    pub fn pending(&self) -> PendingIterator {
        let mut txs = self.inner.lock().txs.clone();
        // stable sort keeps arrival order within equal gas prices
        txs.sort_by(|a, b| b.gas_price.cmp(&a.gas_price));
        PendingIterator {
            txs: txs.into_iter(),
        }
    }

    /// Drop every transaction included in `block`.
    pub fn remove_included(&self, block: &Block) {
        let included: HashSet<TxHash> = block.transactions.iter().map(|tx| tx.hash()).collect();
        let mut inner = self.inner.lock();
        inner.txs.retain(|tx| !included.contains(&tx.hash()));
        inner.seen.retain(|hash| !included.contains(hash));
    }

    pub fn len(&self) -> usize {
        self.inner.lock().txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().txs.is_empty()
    }
}

impl Default for TxPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A finite, non-restartable drain of the pool snapshot taken by
/// [`TxPool::pending`].
pub struct PendingIterator {
    txs: std::vec::IntoIter<Transaction>,
}

impl Iterator for PendingIterator {
    type Item = Transaction;

    fn next(&mut self) -> Option<Transaction> {
        self.txs.next()
    }
}
