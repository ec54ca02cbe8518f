//! Proof-of-authority consensus: candidate block validation, the proposer
//! schedule, and trunk (fork-choice) selection.

pub mod consenter;
pub mod error;
pub mod schedule;

pub use consenter::Consenter;
pub use error::ConsensusError;
