pub mod common;
pub mod share;

pub use common::{TryAdd, TryDiv, TryMul, TrySub, ACC_PRECISION};

use crate::error::FarmError;
use odra::casper_types::U256;

impl TryAdd for U256 {
    fn try_add(self, rhs: Self) -> Result<Self, FarmError> {
        self.checked_add(rhs).ok_or(FarmError::MathOverflow)
    }
}

impl TrySub for U256 {
    fn try_sub(self, rhs: Self) -> Result<Self, FarmError> {
        self.checked_sub(rhs).ok_or(FarmError::MathOverflow)
    }
}

impl TryMul<U256> for U256 {
    fn try_mul(self, rhs: U256) -> Result<Self, FarmError> {
        self.checked_mul(rhs).ok_or(FarmError::MathOverflow)
    }
}

impl TryMul<u64> for U256 {
    fn try_mul(self, rhs: u64) -> Result<Self, FarmError> {
        self.try_mul(U256::from(rhs))
    }
}

impl TryDiv<U256> for U256 {
    fn try_div(self, rhs: U256) -> Result<Self, FarmError> {
        self.checked_div(rhs).ok_or(FarmError::DivisionByZero)
    }
}

/// Accumulator scale as a `U256`.
pub fn acc_precision() -> U256 {
    U256::from(ACC_PRECISION)
}

/// `a * b / c`, floored.
pub fn mul_div(a: U256, b: U256, c: U256) -> Result<U256, FarmError> {
    a.try_mul(b)?.try_div(c)
}
