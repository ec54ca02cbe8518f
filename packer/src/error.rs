use meridian_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    /// The block gas budget is exhausted; adoption must stop.
    #[error("block gas limit reached")]
    GasLimitReached,

    #[error("proposer {0} has no scheduled slot")]
    NotScheduled(Address),

    #[error("declared gas {declared} below intrinsic cost {required}")]
    IntrinsicGas { required: u64, declared: u64 },

    #[error("insufficient balance on {0}")]
    InsufficientBalance(Address),

    #[error("transaction kind not packable")]
    Unsupported,
}

impl PackError {
    /// The expected stop signal during transaction adoption, as opposed to
    /// a per-transaction rejection.
    pub fn is_gas_limit_reached(&self) -> bool {
        matches!(self, Self::GasLimitReached)
    }
}
