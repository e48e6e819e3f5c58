use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::FarmError;
use crate::math::{acc_precision, mul_div, TryAdd};
use crate::state::EmissionSchedule;

/// A weighted bucket of staked collateral.
#[odra::odra_type]
pub struct StakePool {
    /// Ledger address of the staked asset
    pub collateral_asset: Address,
    /// Relative share of emission
    pub weight: U256,
    /// Emission per staked unit, scaled by `ACC_PRECISION`
    pub acc_emission_per_share: U256,
    /// Tick the accumulator is valid up to
    pub last_settled_tick: u64,
    /// Collateral held for this pool
    pub total_staked: U256,
}

/// Outcome of bringing a pool up to a tick, before it is committed.
pub struct Settlement {
    /// Emission allocated to the pool over the settled span
    pub emission: U256,
    pub acc_emission_per_share: U256,
}

impl StakePool {
    /// Empty pool that starts accruing at `first_tick`
    pub fn new(collateral_asset: Address, weight: U256, first_tick: u64) -> Self {
        Self {
            collateral_asset,
            weight,
            acc_emission_per_share: U256::zero(),
            last_settled_tick: first_tick,
            total_staked: U256::zero(),
        }
    }

    /// Compute the accumulator at `current_tick` without mutating the pool.
    ///
    /// An empty pool allocates nothing for the span; the emission is never
    /// minted.
    pub fn settlement(
        &self,
        schedule: &EmissionSchedule,
        total_weight: U256,
        current_tick: u64,
    ) -> Result<Settlement, FarmError> {
        if current_tick <= self.last_settled_tick || self.total_staked.is_zero() {
            return Ok(Settlement {
                emission: U256::zero(),
                acc_emission_per_share: self.acc_emission_per_share,
            });
        }
        let emission = schedule.pool_emission(
            self.last_settled_tick,
            current_tick,
            self.weight,
            total_weight,
        )?;
        let increment = mul_div(emission, acc_precision(), self.total_staked)?;
        Ok(Settlement {
            emission,
            acc_emission_per_share: self.acc_emission_per_share.try_add(increment)?,
        })
    }

    /// Advance the pool to `current_tick`, returning the emission to mint for it.
    pub fn accrue(
        &mut self,
        schedule: &EmissionSchedule,
        total_weight: U256,
        current_tick: u64,
    ) -> Result<U256, FarmError> {
        if current_tick <= self.last_settled_tick {
            return Ok(U256::zero());
        }
        let settlement = self.settlement(schedule, total_weight, current_tick)?;
        self.acc_emission_per_share = settlement.acc_emission_per_share;
        self.last_settled_tick = current_tick;
        Ok(settlement.emission)
    }
}
