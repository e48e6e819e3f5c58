//! Error types shared by every farm contract.
//!
//! Codes are grouped by concern:
//! - 1-9: authorization and identifiers
//! - 10-19: caller-owned balance preconditions
//! - 20-29: migration gating
//! - 30-39: fee conversion
//! - 40-49: vault accounting and math

use core::fmt;
use odra::prelude::*;

/// Every failure a farm contract can revert with; `message()` describes each code.
#[odra::odra_error]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FarmError {
    // 1
    Unauthorized = 1,
    InvalidPool = 2,
    InvalidAsset = 3,
    DuplicatePool = 4,
    NotInitialized = 5,

    // 10
    InsufficientBalance = 10,
    InsufficientAllowance = 11,
    InsufficientStake = 12,
    InsufficientShares = 13,

    // 20
    TooEarly = 20,
    NoMigrationTarget = 21,
    MigrationMismatch = 22,

    // 30
    NoLiquidityToConvert = 30,
    NoRoute = 31,
    SlippageExceeded = 32,
    InvalidPath = 33,

    // 40
    ZeroSharesMinted = 40,
    MathOverflow = 41,
    DivisionByZero = 42,
}

impl FarmError {
    /// Human-readable description of the error
    pub fn message(&self) -> &str {
        match self {
            FarmError::Unauthorized => "Caller lacks the required capability",
            FarmError::InvalidPool => "Unknown stake pool",
            FarmError::InvalidAsset => "Unknown or unusable asset",
            FarmError::DuplicatePool => "Collateral asset already backs a pool",
            FarmError::NotInitialized => "Contract configuration is missing",
            FarmError::InsufficientBalance => "Balance too low for this operation",
            FarmError::InsufficientAllowance => "Allowance too low for this transfer",
            FarmError::InsufficientStake => "Withdraw amount exceeds staked amount",
            FarmError::InsufficientShares => "Share balance too low for this withdrawal",
            FarmError::TooEarly => "Migration is not yet eligible",
            FarmError::NoMigrationTarget => "No migration target registered",
            FarmError::MigrationMismatch => "Replacement balance does not match staked total",
            FarmError::NoLiquidityToConvert => "Collector holds no liquidity in this pair",
            FarmError::NoRoute => "No swap route into the reward asset",
            FarmError::SlippageExceeded => "Swap output below the requested minimum",
            FarmError::InvalidPath => "Swap path must name at least two assets",
            FarmError::ZeroSharesMinted => "Deposit would mint zero shares",
            FarmError::MathOverflow => "Math operation overflow",
            FarmError::DivisionByZero => "Division by zero",
        }
    }
}

impl fmt::Display for FarmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
