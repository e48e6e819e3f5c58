//! Fee-conversion router.
//!
//! The router is the exchange's fee recipient. `convert` burns the liquidity
//! it has collected in one pair, swaps both legs into the reward asset and
//! hands the proceeds to the share vault as revenue.
//!
//! A conversion runs in three stages: every burn result is collected first,
//! then swaps are issued, and the vault is paid last.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::FarmError;
use crate::exchange::ExchangeEngineContractRef;
use crate::ledger::LedgerContractRef;
use crate::math::TryAdd;
use crate::state::MIN_SWAP_OUTPUT;
use crate::vault::ShareVaultContractRef;

/// Parameters for deploying the router
#[odra::odra_type]
pub struct InitRouterParams {
    /// Exchange engine that owns the pairs
    pub exchange: Address,
    /// Share vault receiving the proceeds
    pub vault: Address,
    /// Asset every leg is converted into
    pub reward_asset: Address,
    /// Intermediate hop for assets without a direct reward pair
    pub base_asset: Address,
}

/// A collected position was liquidated into vault revenue.
#[odra::event]
pub struct Converted {
    /// First asset of the pair
    pub asset_a: Address,
    /// Second asset of the pair
    pub asset_b: Address,
    /// Liquidity burned
    pub liquidity: U256,
    /// Reward asset sent to the vault
    pub reward_out: U256,
}

/// Converts collected trading-fee liquidity into vault revenue.
#[odra::module(events = [Converted], errors = FarmError)]
pub struct FeeRouter {
    admin: Var<Address>,
    exchange: Var<Address>,
    vault: Var<Address>,
    reward_asset: Var<Address>,
    base_asset: Var<Address>,
}

/// One side of a burned pair on its way to the reward asset.
struct Leg {
    asset: Address,
    amount: U256,
    /// `None` when the asset already is the reward asset
    path: Option<Vec<Address>>,
}

#[odra::module]
impl FeeRouter {
    /// The deployer becomes admin.
    pub fn init(&mut self, params: InitRouterParams) {
        self.admin.set(self.env().caller());
        self.exchange.set(params.exchange);
        self.vault.set(params.vault);
        self.reward_asset.set(params.reward_asset);
        self.base_asset.set(params.base_asset);
    }

    /// Liquidate the collected position in the `(asset_a, asset_b)` pair and
    /// forward the reward asset obtained to the vault. Callable by anyone.
    #[odra(non_reentrant)]
    pub fn convert(&mut self, asset_a: Address, asset_b: Address) -> U256 {
        let result = self.process_convert(asset_a, asset_b);
        self.or_revert(result)
    }

    /// Change the intermediate hop. Admin only.
    pub fn set_base_asset(&mut self, base_asset: Address) {
        self.assert_admin();
        self.base_asset.set(base_asset);
    }

    /// Redirect proceeds to another vault. Admin only.
    pub fn set_vault(&mut self, vault: Address) {
        self.assert_admin();
        self.vault.set(vault);
    }

    /// Hand the admin role to `new_admin`.
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.assert_admin();
        self.admin.set(new_admin);
    }

    /// Current admin
    pub fn admin(&self) -> Option<Address> {
        self.admin.get()
    }

    /// Exchange engine address
    pub fn exchange(&self) -> Option<Address> {
        self.exchange.get()
    }

    /// Vault receiving proceeds
    pub fn vault(&self) -> Option<Address> {
        self.vault.get()
    }

    /// Asset proceeds are converted into
    pub fn reward_asset(&self) -> Option<Address> {
        self.reward_asset.get()
    }

    /// Intermediate hop asset
    pub fn base_asset(&self) -> Option<Address> {
        self.base_asset.get()
    }
}

impl FeeRouter {
    fn process_convert(&mut self, asset_a: Address, asset_b: Address) -> Result<U256, FarmError> {
        if asset_a == asset_b {
            return Err(FarmError::InvalidAsset);
        }
        let exchange_address = self.exchange.get().ok_or(FarmError::NotInitialized)?;
        let vault_address = self.vault.get().ok_or(FarmError::NotInitialized)?;
        let reward_asset = self.reward_asset.get().ok_or(FarmError::NotInitialized)?;
        let mut exchange = ExchangeEngineContractRef::new(self.env(), exchange_address);
        let this = self.env().self_address();

        let pair = exchange
            .get_pair(asset_a, asset_b)
            .ok_or(FarmError::InvalidAsset)?;
        let mut position = LedgerContractRef::new(self.env(), pair);
        let liquidity = position.balance_of(this);
        if liquidity.is_zero() {
            return Err(FarmError::NoLiquidityToConvert);
        }

        // Routes are resolved before anything moves.
        let (asset_x, asset_y) = exchange.pair_assets(pair);
        let path_x = self.route(&exchange, asset_x, reward_asset)?;
        let path_y = self.route(&exchange, asset_y, reward_asset)?;

        position.approve(exchange_address, liquidity);
        let (amount_x, amount_y) = exchange.burn_liquidity(pair, liquidity, this);
        let legs = [
            Leg {
                asset: asset_x,
                amount: amount_x,
                path: path_x,
            },
            Leg {
                asset: asset_y,
                amount: amount_y,
                path: path_y,
            },
        ];

        let mut reward_out = U256::zero();
        for leg in legs {
            let received = self.swap_leg(&mut exchange, exchange_address, leg)?;
            reward_out = reward_out.try_add(received)?;
        }

        if !reward_out.is_zero() {
            LedgerContractRef::new(self.env(), reward_asset).approve(vault_address, reward_out);
            ShareVaultContractRef::new(self.env(), vault_address).distribute_revenue(reward_out);
        }

        log::info!(
            "converted {} liquidity of {:?} into {} reward",
            liquidity,
            pair,
            reward_out
        );
        self.env().emit_event(Converted {
            asset_a,
            asset_b,
            liquidity,
            reward_out,
        });
        Ok(reward_out)
    }

    /// Path from `asset` to the reward asset: direct if a pair exists, else
    /// through the base asset.
    fn route(
        &self,
        exchange: &ExchangeEngineContractRef,
        asset: Address,
        reward_asset: Address,
    ) -> Result<Option<Vec<Address>>, FarmError> {
        if asset == reward_asset {
            return Ok(None);
        }
        if exchange.get_pair(asset, reward_asset).is_some() {
            return Ok(Some(vec![asset, reward_asset]));
        }
        let base = self.base_asset.get().ok_or(FarmError::NoRoute)?;
        if asset != base
            && exchange.get_pair(asset, base).is_some()
            && exchange.get_pair(base, reward_asset).is_some()
        {
            return Ok(Some(vec![asset, base, reward_asset]));
        }
        log::warn!("no route from {:?} to the reward asset", asset);
        Err(FarmError::NoRoute)
    }

    fn swap_leg(
        &self,
        exchange: &mut ExchangeEngineContractRef,
        exchange_address: Address,
        leg: Leg,
    ) -> Result<U256, FarmError> {
        let path = match leg.path {
            None => return Ok(leg.amount),
            Some(path) => path,
        };
        if leg.amount.is_zero() {
            return Ok(U256::zero());
        }
        LedgerContractRef::new(self.env(), leg.asset).approve(exchange_address, leg.amount);
        let received = exchange.swap(
            path,
            leg.amount,
            U256::from(MIN_SWAP_OUTPUT),
            self.env().self_address(),
        );
        log::debug!("swapped {} of {:?} for {}", leg.amount, leg.asset, received);
        Ok(received)
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
