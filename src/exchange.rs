//! Interfaces of contracts the farm calls but does not implement.

use odra::casper_types::U256;
use odra::prelude::*;

/// Constant-product exchange engine that owns pairs and their pricing curve.
///
/// A pair handle is the address of the pair's liquidity-position ledger.
/// `pair_reserves` and `burn_liquidity` report amounts in `pair_assets` order.
#[odra::external_contract]
pub trait ExchangeEngine {
    fn get_pair(&self, asset_x: Address, asset_y: Address) -> Option<Address>;
    fn pair_assets(&self, pair: Address) -> (Address, Address);
    fn pair_reserves(&self, pair: Address) -> (U256, U256);
    /// Pulls `amount` of the pair's liquidity from the caller (allowance
    /// required) and sends the underlying assets to `recipient`.
    fn burn_liquidity(&mut self, pair: Address, amount: U256, recipient: Address) -> (U256, U256);
    /// Pulls `amount_in` of `path[0]` from the caller and delivers the last
    /// asset of `path` to `recipient`.
    fn swap(
        &mut self,
        path: Vec<Address>,
        amount_in: U256,
        min_amount_out: U256,
        recipient: Address,
    ) -> U256;
}

/// Custodian that exchanges a pool's collateral for a replacement asset.
#[odra::external_contract]
pub trait MigrationTarget {
    /// Pulls `amount` of `asset` from the caller and returns the address of
    /// the replacement asset credited to the caller.
    fn migrate(&mut self, asset: Address, amount: U256) -> Address;
}
