//! Communicator: block subscription fan-out, outbound broadcast queue,
//! and the sync flag.
//!
//! Raw P2P transport is out of scope for the core. The communicator does
//! not write to sockets; it exposes exactly the contract the lifecycle
//! loops consume. The connection layer injects peer-delivered blocks via
//! [`Communicator::deliver_block`] and drains the outbound queue returned
//! by [`Communicator::new`].

use meridian_chain::Block;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// In-process hub between the connection layer and the lifecycle loops.
pub struct Communicator {
    subscribers: Mutex<Vec<mpsc::Sender<Arc<Block>>>>,
    outbound_tx: mpsc::Sender<Arc<Block>>,
    synced: AtomicBool,
}

impl Communicator {
    /// Returns the communicator plus the receiver the connection layer
    /// drains for outbound (broadcast) blocks.
    pub fn new(outbound_capacity: usize) -> (Self, mpsc::Receiver<Arc<Block>>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(outbound_capacity);
        (
            Self {
                subscribers: Mutex::new(Vec::new()),
                outbound_tx,
                synced: AtomicBool::new(false),
            },
            outbound_rx,
        )
    }

    /// Register a channel to receive peer-delivered blocks.
    pub fn subscribe_block(&self, tx: mpsc::Sender<Arc<Block>>) {
        self.subscribers.lock().push(tx);
    }

    /// Hand a peer-delivered block to every subscriber, applying
    /// backpressure to the connection layer when a subscriber is busy.
    pub async fn deliver_block(&self, block: Arc<Block>) {
        let subscribers = self.subscribers.lock().clone();
        for tx in subscribers {
            let _ = tx.send(block.clone()).await;
        }
    }

    /// Queue a block for broadcast to peers. Dropped when the outbound
    /// queue is full: flood gossip is lossy by design.
    pub fn broadcast_block(&self, block: Arc<Block>) {
        let _ = self.outbound_tx.try_send(block);
    }

    /// Whether the sync process considers this node caught up with its
    /// peers. Packing is suppressed until then.
    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Relaxed)
    }

    pub fn set_synced(&self, synced: bool) {
        self.synced.store(synced, Ordering::Relaxed);
    }
}
