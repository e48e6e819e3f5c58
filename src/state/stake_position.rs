use odra::casper_types::U256;

use crate::error::FarmError;
use crate::math::{acc_precision, mul_div, TryAdd, TrySub};

/// One account's stake in one pool.
#[odra::odra_type]
pub struct StakePosition {
    /// Staked collateral
    pub amount: U256,
    /// Accumulator value already credited to this position
    pub reward_debt: U256,
}

impl StakePosition {
    /// Position with nothing staked
    pub fn empty() -> Self {
        Self {
            amount: U256::zero(),
            reward_debt: U256::zero(),
        }
    }

    /// Entitlement not yet paid out at accumulator value `acc`
    pub fn pending(&self, acc_emission_per_share: U256) -> Result<U256, FarmError> {
        self.accrued(acc_emission_per_share)?.try_sub(self.reward_debt)
    }

    /// Re-anchor the debt after the staked amount or accumulator moved
    pub fn sync_debt(&mut self, acc_emission_per_share: U256) -> Result<(), FarmError> {
        self.reward_debt = self.accrued(acc_emission_per_share)?;
        Ok(())
    }

    /// Add `amount` to the stake
    pub fn deposit(&mut self, amount: U256) -> Result<(), FarmError> {
        self.amount = self.amount.try_add(amount)?;
        Ok(())
    }

    /// Remove `amount` from the stake
    pub fn withdraw(&mut self, amount: U256) -> Result<(), FarmError> {
        if amount > self.amount {
            return Err(FarmError::InsufficientStake);
        }
        self.amount = self.amount.try_sub(amount)?;
        Ok(())
    }

    fn accrued(&self, acc_emission_per_share: U256) -> Result<U256, FarmError> {
        mul_div(self.amount, acc_emission_per_share, acc_precision())
    }
}
