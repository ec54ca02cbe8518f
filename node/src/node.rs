//! The main node struct — wires the chain, state, consensus, packing, and
//! networking subsystems together and runs the lifecycle loops.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::mpsc;

use meridian_chain::{Block, Chain};
use meridian_consensus::Consenter;
use meridian_crypto::{address_from_public, keyfile, load_or_generate_key};
use meridian_network::Communicator;
use meridian_packer::Packer;
use meridian_state::StateCreator;
use meridian_types::{ChainParams, KeyPair, NetworkId, PrivateKey};

use crate::config::NodeConfig;
use crate::consent::ConsentLoop;
use crate::events::block_events;
use crate::genesis::{dev_accounts, dev_params, install_genesis};
use crate::pack::PackLoop;
use crate::shutdown::ShutdownController;
use crate::txpool::TxPool;
use crate::NodeError;

/// Capacity of the peer block subscription feeding the consent loop.
const BLOCK_SUB_CAPACITY: usize = 64;
/// Capacity of the outbound broadcast queue.
const OUTBOUND_CAPACITY: usize = 256;

/// A fully wired Meridian node.
pub struct Node {
    chain: Arc<Chain>,
    creator: StateCreator,
    comm: Arc<Communicator>,
    pool: Arc<TxPool>,
    params: ChainParams,
    proposer: Option<KeyPair>,
    shutdown: ShutdownController,
    outbound_rx: Option<mpsc::Receiver<Arc<Block>>>,
}

impl Node {
    /// Build the node: genesis, proposer identity, and subsystems. Loops
    /// are not running until [`Node::start`].
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let params = if config.params.authorities.is_empty() && config.network == NetworkId::Dev {
            dev_params()
        } else {
            config.params.clone()
        };

        let chain = Arc::new(Chain::new());
        let creator = StateCreator::new();
        let genesis_id = install_genesis(&chain, &creator, config.network, &params)?;
        tracing::info!(network = config.network.as_str(), id = %genesis_id, "genesis block ready");

        let proposer = load_proposer(&config)?;
        tracing::info!(proposer = %address_from_public(&proposer.public), "proposer identity loaded");

        let (comm, outbound_rx) = Communicator::new(OUTBOUND_CAPACITY);

        Ok(Self {
            chain,
            creator,
            comm: Arc::new(comm),
            pool: Arc::new(TxPool::new()),
            params,
            proposer: Some(proposer),
            shutdown: ShutdownController::new(),
            outbound_rx: Some(outbound_rx),
        })
    }

    /// Spawn the consent loop, the pack loop, and the outbound drain.
    pub fn start(&mut self) -> Result<(), NodeError> {
        let proposer = self
            .proposer
            .take()
            .ok_or_else(|| NodeError::Config("node already started".into()))?;
        let proposer_addr = address_from_public(&proposer.public);

        let (packer_events, consenter_events) = block_events();

        let (block_tx, block_rx) = mpsc::channel(BLOCK_SUB_CAPACITY);
        self.comm.subscribe_block(block_tx);

        let consenter = Consenter::new(self.chain.clone(), self.params.clone());
        let consent_loop = ConsentLoop::new(
            self.chain.clone(),
            consenter,
            self.comm.clone(),
            block_rx,
            consenter_events,
            self.shutdown.subscribe(),
        );
        self.shutdown.register(tokio::spawn(consent_loop.run()));

        let packer = Packer::new(
            self.creator.clone(),
            proposer_addr,
            proposer_addr,
            self.params.clone(),
        );
        let pack_loop = PackLoop::new(
            self.chain.clone(),
            packer,
            self.comm.clone(),
            self.pool.clone(),
            PrivateKey(proposer.private.0),
            packer_events,
            self.shutdown.subscribe(),
        );
        self.shutdown.register(tokio::spawn(pack_loop.run()));

        if let Some(mut outbound_rx) = self.outbound_rx.take() {
            let mut shutdown = self.shutdown.subscribe();
            self.shutdown.register(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown.recv() => return,
                        maybe = outbound_rx.recv() => match maybe {
                            Some(block) => {
                                // the connection layer owns real peer IO
                                tracing::trace!(id = %block.id(), "handing block to peer transport");
                            }
                            None => return,
                        },
                    }
                }
            }));
        }

        // without a transport attached there is nothing to catch up with
        self.comm.set_synced(true);

        tracing::info!("node started");
        Ok(())
    }

    /// Trigger shutdown and wait for every loop to exit.
    pub async fn stop(&mut self) {
        self.shutdown.stop().await;
        tracing::info!("node stopped");
    }

    /// Park until SIGINT/SIGTERM triggers shutdown.
    pub async fn wait_for_signal(&self) {
        self.shutdown.wait_for_signal().await;
    }

    pub fn chain(&self) -> Arc<Chain> {
        self.chain.clone()
    }

    pub fn pool(&self) -> Arc<TxPool> {
        self.pool.clone()
    }

    pub fn communicator(&self) -> Arc<Communicator> {
        self.comm.clone()
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }
}

/// Resolve the proposer identity: an explicit key wins; the dev network
/// falls back to a random built-in dev account (as real deployments load
/// their key from disk).
fn load_proposer(config: &NodeConfig) -> Result<KeyPair, NodeError> {
    if let Some(hex_key) = &config.proposer_key {
        return Ok(keyfile::parse_key(hex_key)?);
    }
    if config.network == NetworkId::Dev {
        let mut accounts = dev_accounts();
        let index = rand::thread_rng().gen_range(0..accounts.len());
        return Ok(accounts.swap_remove(index));
    }
    Ok(load_or_generate_key(&config.data_dir.join("node.key"))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_node_builds_with_dev_authorities() {
        let node = Node::new(NodeConfig::default()).unwrap();
        assert_eq!(node.params().authorities.len(), dev_accounts().len());
        assert_eq!(node.chain().block_count(), 1);
    }

    #[test]
    fn explicit_proposer_key_is_honored() {
        let kp = dev_accounts().remove(0);
        let config = NodeConfig {
            proposer_key: Some(hex::encode(kp.private.0)),
            ..NodeConfig::default()
        };
        let node = Node::new(config).unwrap();
        let proposer = node.proposer.as_ref().unwrap();
        assert_eq!(proposer.public, kp.public);
    }

    #[test]
    fn non_dev_network_persists_a_node_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = NodeConfig {
            network: NetworkId::Test,
            data_dir: dir.path().to_path_buf(),
            ..NodeConfig::default()
        };
        let node = Node::new(config).unwrap();
        assert!(dir.path().join("node.key").exists());
        drop(node);
    }
}
