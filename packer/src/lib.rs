//! Block packing: slot scheduling, transaction adoption, and sealing.

pub mod engine;
pub mod error;
pub mod executor;

pub use engine::{Packer, Preparation};
pub use error::PackError;
