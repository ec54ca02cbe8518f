//! Development genesis: deterministic funded accounts and authority set.

use crate::NodeError;
use meridian_chain::{build_genesis_block, Chain};
use meridian_crypto::{address_from_public, keypair_from_seed};
use meridian_state::StateCreator;
use meridian_types::{Amount, BlockHash, ChainParams, KeyPair, NetworkId, Timestamp};
use primitive_types::U256;

/// Number of built-in dev accounts.
const DEV_ACCOUNT_COUNT: u8 = 4;

/// Fixed dev genesis timestamp (2024-01-01T00:00:00Z), so the dev genesis
/// id is the same on every machine.
pub const DEV_GENESIS_TIMESTAMP: Timestamp = Timestamp::new(1_704_067_200);

/// Deterministic dev key pairs, derived from tiny fixed seeds. Never use
/// these outside a dev network.
pub fn dev_accounts() -> Vec<KeyPair> {
    (1..=DEV_ACCOUNT_COUNT)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[31] = i;
            keypair_from_seed(&seed)
        })
        .collect()
}

/// Dev-network parameters: every dev account is an authority.
pub fn dev_params() -> ChainParams {
    ChainParams {
        authorities: dev_accounts()
            .iter()
            .map(|kp| address_from_public(&kp.public))
            .collect(),
        ..ChainParams::default()
    }
}

fn dev_endowment() -> Amount {
    // one million whole tokens at 18 decimals
    Amount::new(U256::from(1_000_000u64) * U256::exp10(18))
}

/// Build the initial state and write the genesis block. On the dev
/// network the dev accounts are funded; elsewhere the initial state is
/// empty (real genesis allocation arrives from the genesis collaborator).
pub fn install_genesis(
    chain: &Chain,
    creator: &StateCreator,
    network: NetworkId,
    params: &ChainParams,
) -> Result<BlockHash, NodeError> {
    let mut state = creator.state();
    if network == NetworkId::Dev {
        for kp in dev_accounts() {
            state.set_balance(address_from_public(&kp.public), dev_endowment());
        }
    }
    let state_root = state.commit();
    let block = build_genesis_block(DEV_GENESIS_TIMESTAMP, params.block_gas_limit, state_root);
    let id = block.id();
    chain.write_genesis(block)?;
    Ok(id)
}
