//! Shared scalers and checked-arithmetic traits.
//!
//! Traits return `FarmError` so fixed-point helpers compose with `?` inside
//! contract code and surface as typed reverts at the entry point.

use crate::error::FarmError;

/// Scale applied to the per-share emission accumulator
pub const ACC_PRECISION: u128 = 1_000_000_000_000;

/// Try to subtract, return an error on underflow
pub trait TrySub: Sized {
    /// Subtract
    fn try_sub(self, rhs: Self) -> Result<Self, FarmError>;
}

/// Try to add, return an error on overflow
pub trait TryAdd: Sized {
    /// Add
    fn try_add(self, rhs: Self) -> Result<Self, FarmError>;
}

/// Try to divide, return an error on divide by zero
pub trait TryDiv<RHS>: Sized {
    /// Divide
    fn try_div(self, rhs: RHS) -> Result<Self, FarmError>;
}

/// Try to multiply, return an error on overflow
pub trait TryMul<RHS>: Sized {
    /// Multiply
    fn try_mul(self, rhs: RHS) -> Result<Self, FarmError>;
}
