//! Host-side fixtures shared by the contract tests.

use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv};
use odra::prelude::*;

use crate::ledger::{Ledger, LedgerHostRef, LedgerInitArgs};
use crate::mocks::{MockMigrator, MockMigratorHostRef, MockMigratorInitArgs};
use crate::scheduler::{
    EmissionScheduler, EmissionSchedulerHostRef, EmissionSchedulerInitArgs, InitSchedulerParams,
};
use crate::state::EmissionSchedule;

/// Milliseconds per scheduler tick in tests.
pub const TICK: u64 = 1_000;
pub const EMISSION_PER_TICK: u64 = 10;
pub const BONUS_MULTIPLIER: u64 = 10;
/// Collateral minted to each of accounts 1..=3 in every pool asset.
pub const STARTING_COLLATERAL: u64 = 1_000;

pub fn address_of<T: Addressable>(contract: &T) -> Address {
    contract.address().clone()
}

pub fn deploy_ledger(env: &HostEnv, symbol: &str, minter: Address) -> LedgerHostRef {
    Ledger::deploy(
        env,
        LedgerInitArgs {
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            minter,
        },
    )
}

/// A scheduler wired to its reward ledger plus two collateral ledgers.
pub struct Farm {
    pub env: HostEnv,
    pub admin: Address,
    pub dev: Address,
    pub reward: LedgerHostRef,
    pub collateral: Vec<LedgerHostRef>,
    pub scheduler: EmissionSchedulerHostRef,
}

impl Farm {
    pub fn setup(bonus_end_tick: u64) -> Self {
        Self::build(bonus_end_tick, 0, 0)
    }

    pub fn setup_with_start(bonus_end_tick: u64, start_tick: u64) -> Self {
        Self::build(bonus_end_tick, start_tick, 0)
    }

    pub fn setup_with_migration(bonus_end_tick: u64, migration_eligible_tick: u64) -> Self {
        Self::build(bonus_end_tick, 0, migration_eligible_tick)
    }

    fn build(bonus_end_tick: u64, start_tick: u64, migration_eligible_tick: u64) -> Self {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let dev = env.get_account(4);
        env.set_caller(admin);

        let mut reward = deploy_ledger(&env, "RWD", admin);
        let mut collateral = Vec::new();
        for symbol in ["LP-A", "LP-B"] {
            let mut ledger = deploy_ledger(&env, symbol, admin);
            for account in 1..=3 {
                ledger.mint(env.get_account(account), U256::from(STARTING_COLLATERAL));
            }
            collateral.push(ledger);
        }

        let scheduler = EmissionScheduler::deploy(
            &env,
            EmissionSchedulerInitArgs {
                params: InitSchedulerParams {
                    reward_asset: address_of(&reward),
                    dev_address: dev,
                    schedule: EmissionSchedule {
                        emission_per_tick: U256::from(EMISSION_PER_TICK),
                        start_tick,
                        bonus_end_tick,
                        bonus_multiplier: BONUS_MULTIPLIER,
                    },
                    tick_duration: TICK,
                    migration_eligible_tick,
                },
            },
        );
        reward.set_minter(address_of(&scheduler));

        Self {
            env,
            admin,
            dev,
            reward,
            collateral,
            scheduler,
        }
    }

    /// Register `collateral[index]` with `weight`; pools are numbered in call order.
    pub fn add_pool(&mut self, index: usize, weight: u64) -> u32 {
        let asset = address_of(&self.collateral[index]);
        self.env.set_caller(self.admin);
        self.scheduler.add_pool(U256::from(weight), asset, false)
    }

    /// Approve and deposit as `account`, leaving the admin as caller.
    pub fn stake(&mut self, account: Address, pool_id: u32, amount: U256) {
        let asset = self.scheduler.pool_info(pool_id).collateral_asset;
        let index = self
            .collateral
            .iter()
            .position(|ledger| address_of(ledger) == asset)
            .expect("pool collateral is a fixture ledger");
        let spender = address_of(&self.scheduler);

        self.env.set_caller(account);
        self.collateral[index].approve(spender, amount);
        self.scheduler.deposit(pool_id, amount);
        self.env.set_caller(self.admin);
    }

    /// Deploy a migrator that swaps `collateral[index]` for a fresh ledger.
    pub fn deploy_migrator(&mut self, index: usize) -> (MockMigratorHostRef, LedgerHostRef) {
        self.env.set_caller(self.admin);
        let mut replacement = deploy_ledger(&self.env, "LP-V2", self.admin);
        let mut migrator = MockMigrator::deploy(
            &self.env,
            MockMigratorInitArgs {
                scheduler: address_of(&self.scheduler),
            },
        );
        replacement.set_minter(address_of(&migrator));
        migrator.register_replacement(address_of(&self.collateral[index]), address_of(&replacement));
        (migrator, replacement)
    }
}
