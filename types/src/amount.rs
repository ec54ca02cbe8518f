//! Balance and refund amounts as 256-bit unsigned integers.
//!
//! The VM adds arbitrary refund increments and moves arbitrarily large
//! balances, so amounts are full 256-bit integers rather than machine
//! words. Subtraction wraps: a balance may dip below zero mid-transaction
//! (two's-complement) as long as it nets out non-negative by commit.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 256-bit token or gas-refund quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(U256);

impl Amount {
    pub const ZERO: Self = Self(U256::zero());

    pub fn new(raw: U256) -> Self {
        Self(raw)
    }

    pub fn from_u64(raw: u64) -> Self {
        Self(U256::from(raw))
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Wrapping addition (modulo 2^256).
    pub fn wrapping_add(self, other: Self) -> Self {
        Self(self.0.overflowing_add(other.0).0)
    }

    /// Wrapping subtraction (modulo 2^256); a result "below zero" is the
    /// two's-complement representation of the signed difference.
    pub fn wrapping_sub(self, other: Self) -> Self {
        Self(self.0.overflowing_sub(other.0).0)
    }

    /// Saturating multiplication by a gas quantity.
    pub fn saturating_mul_gas(self, gas: u64) -> Self {
        Self(self.0.saturating_mul(U256::from(gas)))
    }

    /// Big-endian 32-byte representation.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        bytes
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
