use odra::casper_types::U256;

use crate::error::FarmError;
use crate::math::{mul_div, TryMul};

/// Global emission parameters, fixed at scheduler deployment.
#[odra::odra_type]
pub struct EmissionSchedule {
    /// Reward asset minted per tick across all pools
    pub emission_per_tick: U256,
    /// First tick that accrues emission
    pub start_tick: u64,
    /// Ticks strictly before this one earn the bonus rate
    pub bonus_end_tick: u64,
    /// Rate applied to bonus ticks
    pub bonus_multiplier: u64,
}

impl EmissionSchedule {
    /// Weighted tick count for the span `[from, to)`.
    ///
    /// Splits the span at `bonus_end_tick` so bonus and base ticks are
    /// priced separately.
    pub fn multiplier(&self, from: u64, to: u64) -> Result<U256, FarmError> {
        if to <= from {
            return Ok(U256::zero());
        }
        let bonus = U256::from(self.bonus_multiplier);
        if to <= self.bonus_end_tick {
            U256::from(to - from).try_mul(bonus)
        } else if from >= self.bonus_end_tick {
            Ok(U256::from(to - from))
        } else {
            let boosted = U256::from(self.bonus_end_tick - from).try_mul(bonus)?;
            boosted
                .checked_add(U256::from(to - self.bonus_end_tick))
                .ok_or(FarmError::MathOverflow)
        }
    }

    /// Emission owed to a pool of `weight` out of `total_weight` over `[from, to)`.
    pub fn pool_emission(
        &self,
        from: u64,
        to: u64,
        weight: U256,
        total_weight: U256,
    ) -> Result<U256, FarmError> {
        if total_weight.is_zero() {
            return Ok(U256::zero());
        }
        let gross = self.multiplier(from, to)?.try_mul(self.emission_per_tick)?;
        mul_div(gross, weight, total_weight)
    }
}
