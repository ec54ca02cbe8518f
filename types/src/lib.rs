//! Fundamental types for the Meridian proof-of-authority chain.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, hashes, amounts, timestamps, key material, VM logs,
//! and protocol parameters.

pub mod address;
pub mod amount;
pub mod hash;
pub mod keys;
pub mod log;
pub mod network;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use hash::{BlockHash, Hash, TxHash};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use log::Log;
pub use network::NetworkId;
pub use params::ChainParams;
pub use time::Timestamp;
