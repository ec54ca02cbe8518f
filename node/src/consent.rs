//! Consent loop — validates and integrates incoming blocks.
//!
//! Multiplexes three sources: candidate blocks delivered by peers,
//! locally packed blocks handed over by the pack loop, and shutdown.
//! Network candidates are deduplicated against the chain, validated by the
//! consenter, appended, and rebroadcast when they extend the trunk. Packed
//! blocks take the cheaper `is_trunk` path; whatever happens there, the
//! packer is always released with exactly one ack.

use crate::events::ConsenterEvents;
use meridian_chain::{Block, Chain};
use meridian_consensus::Consenter;
use meridian_network::Communicator;
use meridian_types::Timestamp;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

pub struct ConsentLoop {
    chain: Arc<Chain>,
    consenter: Consenter,
    comm: Arc<Communicator>,
    block_rx: mpsc::Receiver<Arc<Block>>,
    events: ConsenterEvents,
    shutdown: broadcast::Receiver<()>,
}

impl ConsentLoop {
    pub fn new(
        chain: Arc<Chain>,
        consenter: Consenter,
        comm: Arc<Communicator>,
        block_rx: mpsc::Receiver<Arc<Block>>,
        events: ConsenterEvents,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            chain,
            consenter,
            comm,
            block_rx,
            events,
            shutdown,
        }
    }

    /// Run until shutdown or until both block sources are gone.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown.recv() => return,
                maybe = self.block_rx.recv() => match maybe {
                    Some(block) => self.on_network_block(block).await,
                    None => return,
                },
                maybe = self.events.recv_packed() => match maybe {
                    Some(block) => self.on_packed_block(block).await,
                    None => return,
                },
            }
        }
    }

    async fn on_network_block(&mut self, block: Arc<Block>) {
        let id = block.id();
        // dedupe: proceed only when the chain has never seen this id
        match self.chain.get_header(&id) {
            Ok(_) => return,
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                tracing::warn!(%id, error = %e, "chain lookup failed");
                return;
            }
        }

        let number = block.header.number;
        let size = block.size();
        let proposer = block.header.signer_address();
        match self.consenter.consent(&block, Timestamp::now()) {
            Ok(on_trunk) => {
                if let Err(e) = self.chain.add_block(block.clone(), on_trunk) {
                    tracing::warn!(number, %id, error = %e, "failed to append block");
                    return;
                }
                if on_trunk {
                    tracing::info!(number, %id, size, %proposer, "received new block (trunk)");
                    self.comm.broadcast_block(block);
                    self.events.notify_best_block();
                } else {
                    tracing::info!(number, %id, size, %proposer, "received new block (branch)");
                }
            }
            Err(e) => {
                tracing::warn!(number, %id, size, %proposer, error = %e, "received bad block");
            }
        }
    }

    async fn on_packed_block(&mut self, block: Arc<Block>) {
        match self.consenter.is_trunk(&block.header) {
            Ok(on_trunk) => match self.chain.add_block(block.clone(), on_trunk) {
                Ok(()) => {
                    if on_trunk {
                        self.comm.broadcast_block(block);
                    }
                }
                Err(e) => {
                    tracing::warn!(id = %block.id(), error = %e, "failed to append packed block");
                }
            },
            Err(e) => {
                tracing::warn!(id = %block.id(), error = %e, "packed block failed trunk check");
            }
        }
        // the packer is blocked on this ack; release it on every path
        self.events.ack().await;
    }
}
