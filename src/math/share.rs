//! Pooled-share conversion used by the share vault.
//!
//! Both directions floor, so rounding always favours the vault.

use odra::casper_types::U256;

use crate::error::FarmError;
use crate::math::mul_div;

/// Shares minted for `amount` given the vault state *before* the deposit lands.
///
/// An empty vault (no shares or no held balance) mints 1:1.
pub fn shares_for_deposit(amount: U256, share_supply: U256, held: U256) -> Result<U256, FarmError> {
    if share_supply.is_zero() || held.is_zero() {
        return Ok(amount);
    }
    mul_div(amount, share_supply, held)
}

/// Reward asset paid out for burning `shares`.
pub fn payout_for_shares(shares: U256, share_supply: U256, held: U256) -> Result<U256, FarmError> {
    if share_supply.is_zero() {
        return Err(FarmError::InsufficientShares);
    }
    mul_div(shares, held, share_supply)
}
