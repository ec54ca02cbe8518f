//! Pack loop — proposes new blocks in this node's authority slots.
//!
//! Every tick: if the node is synced, prepare a build on top of the
//! current best block and park until the scheduled slot opens. The wait is
//! cut short when the consent loop signals a fresher chain tip (the
//! preparation is stale and discarded) or on shutdown. When the slot
//! opens: adopt pending transactions until the gas budget is exhausted,
//! seal, hand the block to the consent loop, and wait for its ack before
//! the next attempt.

use crate::events::PackerEvents;
use crate::txpool::TxPool;
use meridian_chain::Chain;
use meridian_network::Communicator;
use meridian_packer::Packer;
use meridian_types::{PrivateKey, Timestamp};
use meridian_utils::format_duration;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Seconds between proposal attempts.
const TICK_INTERVAL: Duration = Duration::from_secs(2);

pub struct PackLoop {
    chain: Arc<Chain>,
    packer: Packer,
    comm: Arc<Communicator>,
    pool: Arc<TxPool>,
    key: PrivateKey,
    events: PackerEvents,
    shutdown: broadcast::Receiver<()>,
}

impl PackLoop {
    pub fn new(
        chain: Arc<Chain>,
        packer: Packer,
        comm: Arc<Communicator>,
        pool: Arc<TxPool>,
        key: PrivateKey,
        events: PackerEvents,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            chain,
            packer,
            comm,
            pool,
            key,
            events,
            shutdown,
        }
    }

    /// Run until shutdown.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = self.shutdown.recv() => return,
                _ = ticker.tick() => {
                    if self.comm.is_synced() {
                        self.pack_once().await;
                    }
                }
            }
        }
    }

    /// One proposal attempt: prepare atop the current best block, wait for
    /// the slot, adopt transactions, seal, and hand over to consent.
    pub async fn pack_once(&mut self) {
        let best = match self.chain.get_best_block() {
            Ok(best) => best,
            Err(e) => {
                tracing::debug!(error = %e, "best block unavailable, skipping tick");
                return;
            }
        };

        let now = Timestamp::now();
        let mut prep = match self.packer.prepare(&best.header, now) {
            Ok(prep) => prep,
            Err(e) => {
                tracing::debug!(error = %e, "not packing this tick");
                return;
            }
        };

        let wait_secs = prep.slot_ts().secs_since(now);
        tracing::info!(
            number = best.header.number + 1,
            after = %format_duration(wait_secs),
            "waiting to propose new block"
        );

        tokio::select! {
            _ = self.shutdown.recv() => {}
            _ = self.events.best_block_updated() => {
                tracing::debug!("chain tip advanced, discarding preparation");
            }
            _ = tokio::time::sleep(Duration::from_secs(wait_secs)) => {
                let mut pending = self.pool.pending();
                for tx in pending.by_ref() {
                    match prep.adopt(tx) {
                        Err(e) if e.is_gas_limit_reached() => break,
                        Err(e) => tracing::debug!(error = %e, "transaction skipped"),
                        Ok(()) => {}
                    }
                }

                // receipts go to the log index collaborator, not the core
                let (block, _receipts) = match prep.commit(&self.key) {
                    Ok(sealed) => sealed,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to seal block");
                        return;
                    }
                };
                tracing::info!(
                    number = block.header.number,
                    id = %block.id(),
                    size = block.size(),
                    "proposed new block"
                );

                let block = Arc::new(block);
                if !self.events.send_packed(block.clone()).await {
                    return;
                }
                if !self.events.wait_ack().await {
                    return;
                }
                self.pool.remove_included(&block);
            }
        }
    }
}
