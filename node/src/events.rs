//! The event bus between the pack loop and the consent loop.
//!
//! Three channels, matching the strict handoff the two loops require:
//! - `new_block_packed`: the packer hands a freshly sealed block over;
//! - `new_block_ack`: the consent loop releases the packer once the block
//!   is durable in the chain store;
//! - `best_block_update`: advisory wake-up for a packer parked in its
//!   slot-wait window. Delivered only to a parked waiter and dropped
//!   otherwise, since a packer that is not waiting will read a fresher
//!   chain tip on its next tick anyway.
//!
//! The packed/ack channels are single-slot mailboxes. Combined with the
//! loops' discipline (the packer always blocks on the ack before its next
//! attempt) this preserves the ordering guarantee: send-packed happens
//! before the chain write, which happens before the ack, which happens
//! before the next pack attempt.

use meridian_chain::Block;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// Endpoints held by the pack loop.
pub struct PackerEvents {
    packed_tx: mpsc::Sender<Arc<Block>>,
    ack_rx: mpsc::Receiver<()>,
    best_update: Arc<Notify>,
}

/// Endpoints held by the consent loop.
pub struct ConsenterEvents {
    packed_rx: mpsc::Receiver<Arc<Block>>,
    ack_tx: mpsc::Sender<()>,
    best_update: Arc<Notify>,
}

/// Build the bus linking the two loops.
pub fn block_events() -> (PackerEvents, ConsenterEvents) {
    let (packed_tx, packed_rx) = mpsc::channel(1);
    let (ack_tx, ack_rx) = mpsc::channel(1);
    let best_update = Arc::new(Notify::new());
    (
        PackerEvents {
            packed_tx,
            ack_rx,
            best_update: best_update.clone(),
        },
        ConsenterEvents {
            packed_rx,
            ack_tx,
            best_update,
        },
    )
}

impl PackerEvents {
    /// Hand a sealed block to the consent loop. `false` when the loop is
    /// gone.
    pub async fn send_packed(&self, block: Arc<Block>) -> bool {
        self.packed_tx.send(block).await.is_ok()
    }

    /// Block until the consent loop has integrated the packed block.
    /// `false` when the loop is gone.
    pub async fn wait_ack(&mut self) -> bool {
        self.ack_rx.recv().await.is_some()
    }

    /// Resolves when the chain tip advances while we are waiting.
    pub async fn best_block_updated(&self) {
        self.best_update.notified().await;
    }
}

impl ConsenterEvents {
    /// Next locally packed block, or `None` when the packer is gone.
    pub async fn recv_packed(&mut self) -> Option<Arc<Block>> {
        self.packed_rx.recv().await
    }

    /// Release the packer after its block has been handled.
    pub async fn ack(&self) {
        let _ = self.ack_tx.send(()).await;
    }

    /// Wake a packer parked in its wait window; dropped when none is.
    pub fn notify_best_block(&self) {
        self.best_update.notify_waiters();
    }
}
