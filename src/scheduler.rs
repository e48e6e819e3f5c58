//! Emission scheduler.
//!
//! Mints the reward asset every tick and splits it across weighted stake
//! pools. Accrual is lazy: a pool's accumulator only moves when a call touches
//! it, and each position settles against the accumulator through its reward
//! debt, so no call ever iterates stakers.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::FarmError;
use crate::exchange::MigrationTargetContractRef;
use crate::ledger::LedgerContractRef;
use crate::math::{TryAdd, TrySub};
use crate::state::{
    EmissionSchedule, StakePool, StakePosition, TickClock, DEV_SHARE_DIVISOR,
};

/// Parameters for deploying the scheduler
#[odra::odra_type]
pub struct InitSchedulerParams {
    /// Reward ledger; the scheduler must be made its minter before emission starts
    pub reward_asset: Address,
    /// Receives the dev share of every accrual
    pub dev_address: Address,
    /// Emission rate and bonus window
    pub schedule: EmissionSchedule,
    /// Milliseconds per tick
    pub tick_duration: u64,
    /// First tick at which `migrate` is allowed
    pub migration_eligible_tick: u64,
}

/// Collateral staked (zero for a harvest).
#[odra::event]
pub struct Deposit {
    /// Staker
    pub user: Address,
    /// Pool index
    pub pool_id: u32,
    /// Collateral units
    pub amount: U256,
}

/// Collateral unstaked.
#[odra::event]
pub struct Withdraw {
    /// Staker
    pub user: Address,
    /// Pool index
    pub pool_id: u32,
    /// Collateral units
    pub amount: U256,
}

/// Stake returned with its entitlement forfeited.
#[odra::event]
pub struct EmergencyWithdraw {
    /// Staker
    pub user: Address,
    /// Pool index
    pub pool_id: u32,
    /// Collateral units
    pub amount: U256,
}

/// New pool registered.
#[odra::event]
pub struct PoolAdded {
    /// Pool index
    pub pool_id: u32,
    /// Ledger of the staked asset
    pub collateral_asset: Address,
    /// Relative share of emission
    pub weight: U256,
}

/// Pool reweighted.
#[odra::event]
pub struct PoolWeightChanged {
    /// Pool index
    pub pool_id: u32,
    /// Relative share of emission
    pub weight: U256,
}

/// Pool collateral moved to the migration target.
#[odra::event]
pub struct PoolMigrated {
    /// Pool index
    pub pool_id: u32,
    /// Collateral before migration
    pub old_asset: Address,
    /// Replacement collateral
    pub new_asset: Address,
    /// Collateral units
    pub amount: U256,
}

#[odra::module(
    events = [Deposit, Withdraw, EmergencyWithdraw, PoolAdded, PoolWeightChanged, PoolMigrated],
    errors = FarmError
)]
/// Mints the reward asset per tick across weighted stake pools.
pub struct EmissionScheduler {
    admin: Var<Address>,
    dev_address: Var<Address>,
    reward_asset: Var<Address>,
    schedule: Var<EmissionSchedule>,
    clock: Var<TickClock>,
    migration_eligible_tick: Var<u64>,
    migration_target: Var<Address>,

    pools: Mapping<u32, StakePool>,
    pool_count: Var<u32>,
    positions: Mapping<(u32, Address), StakePosition>,
    collateral_in_use: Mapping<Address, bool>,
    total_weight: Var<U256>,
}

#[odra::module]
impl EmissionScheduler {
    // ===========================================================================
    // CONSTRUCTOR
    // ===========================================================================
    /// The deployer becomes admin; tick 0 starts at the deployment block time.
    pub fn init(&mut self, params: InitSchedulerParams) {
        let genesis = self.env().get_block_time();
        self.admin.set(self.env().caller());
        self.dev_address.set(params.dev_address);
        self.reward_asset.set(params.reward_asset);
        self.schedule.set(params.schedule);
        self.clock.set(TickClock::new(genesis, params.tick_duration));
        self.migration_eligible_tick.set(params.migration_eligible_tick);
        self.pool_count.set(0);
        self.total_weight.set(U256::zero());
    }

    // ===========================================================================
    // POOL ADMINISTRATION
    // ===========================================================================

    /// Register a new pool for `collateral_asset`; returns its id.
    pub fn add_pool(&mut self, weight: U256, collateral_asset: Address, with_update: bool) -> u32 {
        self.assert_admin();
        let result = self.process_add_pool(weight, collateral_asset, with_update);
        self.or_revert(result)
    }

    /// Change a pool's weight, optionally settling every pool first.
    pub fn set_weight(&mut self, pool_id: u32, weight: U256, with_update: bool) {
        self.assert_admin();
        let result = self.process_set_weight(pool_id, weight, with_update);
        self.or_revert(result)
    }

    /// Settle every pool up to the current tick.
    pub fn mass_update_pools(&mut self) {
        let result = self.settle_all();
        self.or_revert(result)
    }

    /// Settle one pool up to the current tick.
    pub fn update_pool(&mut self, pool_id: u32) {
        let result = self.settle_pool(pool_id).map(|_| ());
        self.or_revert(result)
    }

    // ===========================================================================
    // STAKING
    // ===========================================================================

    /// Stake `amount` of the pool's collateral and collect pending emission.
    ///
    /// A zero amount only harvests.
    pub fn deposit(&mut self, pool_id: u32, amount: U256) {
        let result = self.process_deposit(pool_id, amount);
        self.or_revert(result)
    }

    /// Unstake `amount` and collect pending emission.
    pub fn withdraw(&mut self, pool_id: u32, amount: U256) {
        let result = self.process_withdraw(pool_id, amount);
        self.or_revert(result)
    }

    /// Return the caller's whole stake without touching emission.
    ///
    /// Unpaid entitlement is forfeited and nothing is minted, so this path
    /// stays usable even when the reward ledger misbehaves.
    pub fn emergency_withdraw(&mut self, pool_id: u32) {
        let result = self.process_emergency_withdraw(pool_id);
        self.or_revert(result)
    }

    /// What a harvest would pay `account` right now.
    pub fn pending_entitlement(&self, pool_id: u32, account: Address) -> U256 {
        let result = self.preview_pending(pool_id, account);
        self.or_revert(result)
    }

    // ===========================================================================
    // MIGRATION
    // ===========================================================================

    /// Move the pool's staked collateral to the migration target and adopt the
    /// replacement asset it hands back.
    pub fn migrate(&mut self, pool_id: u32) {
        self.assert_admin();
        let result = self.process_migrate(pool_id);
        self.or_revert(result)
    }

    /// Register the custodian used by `migrate`.
    pub fn set_migration_target(&mut self, target: Address) {
        self.assert_admin();
        self.migration_target.set(target);
    }

    // ===========================================================================
    // AUTHORITY
    // ===========================================================================

    /// Hand the admin role to `new_admin`.
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.assert_admin();
        self.admin.set(new_admin);
    }

    /// Only the current dev address may hand the dev share to someone else.
    pub fn set_dev_address(&mut self, new_dev: Address) {
        if self.dev_address.get() != Some(self.env().caller()) {
            self.env().revert(FarmError::Unauthorized);
        }
        self.dev_address.set(new_dev);
    }

    // ===========================================================================
    // VIEWS
    // ===========================================================================

    /// Number of pools
    pub fn pool_length(&self) -> u32 {
        self.pool_count.get_or_default()
    }

    /// Stored pool record, as of its last settlement
    pub fn pool_info(&self, pool_id: u32) -> StakePool {
        let result = self.load_pool(pool_id);
        self.or_revert(result)
    }

    /// `account`'s stake in the pool
    pub fn position_of(&self, pool_id: u32, account: Address) -> StakePosition {
        self.load_position(pool_id, account)
    }

    /// Sum of all pool weights
    pub fn total_weight(&self) -> U256 {
        self.total_weight.get_or_default()
    }

    /// Emission parameters
    pub fn schedule(&self) -> EmissionSchedule {
        let result = self.load_schedule();
        self.or_revert(result)
    }

    /// Tick of the current block
    pub fn current_tick(&self) -> u64 {
        match self.clock.get() {
            Some(clock) => clock.tick_at(self.env().get_block_time()),
            None => 0,
        }
    }

    /// Bonus-weighted tick count over `[from, to)`
    pub fn multiplier(&self, from: u64, to: u64) -> U256 {
        let result = self.load_schedule().and_then(|s| s.multiplier(from, to));
        self.or_revert(result)
    }

    /// Current admin
    pub fn admin(&self) -> Option<Address> {
        self.admin.get()
    }

    /// Current dev share recipient
    pub fn dev_address(&self) -> Option<Address> {
        self.dev_address.get()
    }

    /// Ledger of the emitted asset
    pub fn reward_asset(&self) -> Option<Address> {
        self.reward_asset.get()
    }

    /// Registered migration custodian
    pub fn migration_target(&self) -> Option<Address> {
        self.migration_target.get()
    }

    /// First tick at which migration is allowed
    pub fn migration_eligible_tick(&self) -> u64 {
        self.migration_eligible_tick.get_or_default()
    }
}

impl EmissionScheduler {
    fn process_add_pool(
        &mut self,
        weight: U256,
        collateral_asset: Address,
        with_update: bool,
    ) -> Result<u32, FarmError> {
        if self.collateral_in_use.get_or_default(&collateral_asset) {
            return Err(FarmError::DuplicatePool);
        }
        if with_update {
            self.settle_all()?;
        }
        let schedule = self.load_schedule()?;
        let first_tick = self.current_tick().max(schedule.start_tick);

        let pool_id = self.pool_length();
        self.pools
            .set(&pool_id, StakePool::new(collateral_asset, weight, first_tick));
        self.pool_count.set(pool_id + 1);
        self.collateral_in_use.set(&collateral_asset, true);
        self.total_weight.set(self.total_weight().try_add(weight)?);

        log::info!("pool {} added with weight {}", pool_id, weight);
        self.env().emit_event(PoolAdded {
            pool_id,
            collateral_asset,
            weight,
        });
        Ok(pool_id)
    }

    fn process_set_weight(
        &mut self,
        pool_id: u32,
        weight: U256,
        with_update: bool,
    ) -> Result<(), FarmError> {
        // validate before settling so an unknown id fails fast
        self.load_pool(pool_id)?;
        if with_update {
            self.settle_all()?;
        }
        let mut pool = self.load_pool(pool_id)?;
        let total = self
            .total_weight()
            .try_sub(pool.weight)?
            .try_add(weight)?;
        pool.weight = weight;
        self.pools.set(&pool_id, pool);
        self.total_weight.set(total);

        self.env().emit_event(PoolWeightChanged { pool_id, weight });
        Ok(())
    }

    fn process_deposit(&mut self, pool_id: u32, amount: U256) -> Result<(), FarmError> {
        let caller = self.env().caller();
        let mut pool = self.settle_pool(pool_id)?;
        let mut position = self.load_position(pool_id, caller);
        let pending = position.pending(pool.acc_emission_per_share)?;

        if !amount.is_zero() {
            let mut collateral = self.ledger(pool.collateral_asset);
            if collateral.balance_of(caller) < amount {
                return Err(FarmError::InsufficientBalance);
            }
            collateral.transfer_from(caller, self.env().self_address(), amount);
        }

        position.deposit(amount)?;
        position.sync_debt(pool.acc_emission_per_share)?;
        pool.total_staked = pool.total_staked.try_add(amount)?;
        self.pools.set(&pool_id, pool);
        self.positions.set(&(pool_id, caller), position);

        self.pay_reward(caller, pending);
        self.env().emit_event(Deposit {
            user: caller,
            pool_id,
            amount,
        });
        Ok(())
    }

    fn process_withdraw(&mut self, pool_id: u32, amount: U256) -> Result<(), FarmError> {
        let caller = self.env().caller();
        // reject before settling so a bad id or amount mints nothing
        self.load_pool(pool_id)?;
        if amount > self.load_position(pool_id, caller).amount {
            return Err(FarmError::InsufficientStake);
        }

        let mut pool = self.settle_pool(pool_id)?;
        let mut position = self.load_position(pool_id, caller);
        let pending = position.pending(pool.acc_emission_per_share)?;

        position.withdraw(amount)?;
        position.sync_debt(pool.acc_emission_per_share)?;
        pool.total_staked = pool.total_staked.try_sub(amount)?;
        let collateral_asset = pool.collateral_asset;
        self.pools.set(&pool_id, pool);
        self.positions.set(&(pool_id, caller), position);

        self.pay_reward(caller, pending);
        if !amount.is_zero() {
            self.ledger(collateral_asset).transfer(caller, amount);
        }
        self.env().emit_event(Withdraw {
            user: caller,
            pool_id,
            amount,
        });
        Ok(())
    }

    fn process_emergency_withdraw(&mut self, pool_id: u32) -> Result<(), FarmError> {
        let caller = self.env().caller();
        let mut pool = self.load_pool(pool_id)?;
        let amount = self.load_position(pool_id, caller).amount;

        pool.total_staked = pool.total_staked.try_sub(amount)?;
        let collateral_asset = pool.collateral_asset;
        self.pools.set(&pool_id, pool);
        self.positions.set(&(pool_id, caller), StakePosition::empty());

        if !amount.is_zero() {
            self.ledger(collateral_asset).transfer(caller, amount);
        }
        log::warn!("emergency withdraw of {} from pool {}", amount, pool_id);
        self.env().emit_event(EmergencyWithdraw {
            user: caller,
            pool_id,
            amount,
        });
        Ok(())
    }

    fn preview_pending(&self, pool_id: u32, account: Address) -> Result<U256, FarmError> {
        let pool = self.load_pool(pool_id)?;
        let schedule = self.load_schedule()?;
        let settlement = pool.settlement(&schedule, self.total_weight(), self.current_tick())?;
        self.load_position(pool_id, account)
            .pending(settlement.acc_emission_per_share)
    }

    fn process_migrate(&mut self, pool_id: u32) -> Result<(), FarmError> {
        if self.current_tick() < self.migration_eligible_tick() {
            return Err(FarmError::TooEarly);
        }
        let target = self
            .migration_target
            .get()
            .ok_or(FarmError::NoMigrationTarget)?;
        let mut pool = self.load_pool(pool_id)?;
        let old_asset = pool.collateral_asset;
        let amount = pool.total_staked;
        let this = self.env().self_address();

        self.ledger(old_asset).approve(target, amount);
        let new_asset = MigrationTargetContractRef::new(self.env(), target).migrate(old_asset, amount);
        if new_asset != old_asset && self.collateral_in_use.get_or_default(&new_asset) {
            return Err(FarmError::DuplicatePool);
        }
        if self.ledger(new_asset).balance_of(this) != amount {
            return Err(FarmError::MigrationMismatch);
        }

        pool.collateral_asset = new_asset;
        self.pools.set(&pool_id, pool);
        self.collateral_in_use.set(&old_asset, false);
        self.collateral_in_use.set(&new_asset, true);

        log::info!("pool {} migrated, {} units moved", pool_id, amount);
        self.env().emit_event(PoolMigrated {
            pool_id,
            old_asset,
            new_asset,
            amount,
        });
        Ok(())
    }

    fn settle_all(&mut self) -> Result<(), FarmError> {
        for pool_id in 0..self.pool_length() {
            self.settle_pool(pool_id)?;
        }
        Ok(())
    }

    /// Bring one pool up to the current tick and mint what it accrued.
    fn settle_pool(&mut self, pool_id: u32) -> Result<StakePool, FarmError> {
        let mut pool = self.load_pool(pool_id)?;
        let schedule = self.load_schedule()?;
        let emission = pool.accrue(&schedule, self.total_weight(), self.current_tick())?;
        let settled_tick = pool.last_settled_tick;
        self.pools.set(&pool_id, pool);

        if !emission.is_zero() {
            let reward_asset = self.reward_asset.get().ok_or(FarmError::NotInitialized)?;
            let dev = self.dev_address.get().ok_or(FarmError::NotInitialized)?;
            let mut reward = self.ledger(reward_asset);
            let dev_share = emission / U256::from(DEV_SHARE_DIVISOR);
            if !dev_share.is_zero() {
                reward.mint(dev, dev_share);
            }
            reward.mint(self.env().self_address(), emission);
            log::debug!(
                "pool {} settled to tick {}, emitted {}",
                pool_id,
                settled_tick,
                emission
            );
        }
        self.load_pool(pool_id)
    }

    /// Pay out reward, capped at what the scheduler actually holds.
    fn pay_reward(&self, to: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let reward_asset = match self.reward_asset.get() {
            Some(asset) => asset,
            None => self.env().revert(FarmError::NotInitialized),
        };
        let mut reward = self.ledger(reward_asset);
        let held = reward.balance_of(self.env().self_address());
        let payout = amount.min(held);
        if !payout.is_zero() {
            reward.transfer(to, payout);
        }
    }

    fn load_pool(&self, pool_id: u32) -> Result<StakePool, FarmError> {
        self.pools.get(&pool_id).ok_or(FarmError::InvalidPool)
    }

    fn load_position(&self, pool_id: u32, account: Address) -> StakePosition {
        self.positions
            .get(&(pool_id, account))
            .unwrap_or_else(StakePosition::empty)
    }

    fn load_schedule(&self) -> Result<EmissionSchedule, FarmError> {
        self.schedule.get().ok_or(FarmError::NotInitialized)
    }

    fn ledger(&self, asset: Address) -> LedgerContractRef {
        LedgerContractRef::new(self.env(), asset)
    }

    fn assert_admin(&self) {
        if self.admin.get() != Some(self.env().caller()) {
            self.env().revert(FarmError::Unauthorized);
        }
    }

    fn or_revert<T>(&self, result: Result<T, FarmError>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.env().revert(err),
        }
    }
}
