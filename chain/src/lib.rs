//! Blocks, transactions, and the canonical chain store.

pub mod block;
pub mod error;
pub mod genesis;
pub mod store;
pub mod transaction;

pub use block::{Block, Header};
pub use error::ChainError;
pub use genesis::build_genesis_block;
pub use store::Chain;
pub use transaction::{Receipt, Transaction};
