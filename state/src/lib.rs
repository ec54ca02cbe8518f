//! Checkpointed execution state for the Meridian VM.
//!
//! Three layers, bottom up:
//! - [`stackedmap::StackedMap`]: a generic stack of key/value overlay
//!   frames with a default-value getter and ordered journal traversal;
//! - [`state::State`]: the account/storage store, layering a stacked map
//!   of typed keys over a shared committed base, with nested
//!   checkpoint/revert and a commit that flushes to the base;
//! - [`statedb::StateDb`]: the facade the VM consumes for reads, writes,
//!   balance mutation, suicides, refunds, preimages, logs, and
//!   arbitrary-depth snapshot/revert spanning both layers.

pub mod stackedmap;
pub mod state;
pub mod statedb;

pub use stackedmap::StackedMap;
pub use state::{State, StateCreator};
pub use statedb::StateDb;
