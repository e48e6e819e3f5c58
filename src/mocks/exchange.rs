use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::FarmError;
use crate::ledger::LedgerContractRef;
use crate::math::{mul_div, TryAdd, TryMul, TrySub};

const FEE_NUMERATOR: u64 = 997;
const FEE_DENOMINATOR: u64 = 1_000;

/// Minimal constant-product exchange used as the engine in host tests.
///
/// Each pair is backed by a `Ledger` liquidity token whose minter is this
/// contract. Reserves are tracked per pair in `pair_assets` order.
#[odra::module(errors = FarmError)]
pub struct MockExchange {
    pairs: Mapping<(Address, Address), Address>,
    assets: Mapping<Address, (Address, Address)>,
    reserves: Mapping<Address, (U256, U256)>,
    fee_to: Var<Address>,
}

#[odra::module]
impl MockExchange {
    pub fn init(&mut self, fee_to: Address) {
        self.fee_to.set(fee_to);
    }

    pub fn set_fee_to(&mut self, fee_to: Address) {
        self.fee_to.set(fee_to);
    }

    pub fn register_pair(&mut self, asset_x: Address, asset_y: Address, liquidity_token: Address) {
        self.pairs.set(&(asset_x, asset_y), liquidity_token);
        self.pairs.set(&(asset_y, asset_x), liquidity_token);
        self.assets.set(&liquidity_token, (asset_x, asset_y));
        self.reserves.set(&liquidity_token, (U256::zero(), U256::zero()));
    }

    pub fn get_pair(&self, asset_x: Address, asset_y: Address) -> Option<Address> {
        self.pairs.get(&(asset_x, asset_y))
    }

    pub fn pair_assets(&self, pair: Address) -> (Address, Address) {
        match self.assets.get(&pair) {
            Some(assets) => assets,
            None => self.env().revert(FarmError::InvalidAsset),
        }
    }

    pub fn pair_reserves(&self, pair: Address) -> (U256, U256) {
        self.reserves.get_or_default(&pair)
    }

    /// Deposit both assets and mint liquidity to `recipient`.
    pub fn add_liquidity(
        &mut self,
        asset_x: Address,
        asset_y: Address,
        amount_x: U256,
        amount_y: U256,
        recipient: Address,
    ) -> U256 {
        let result = self.process_add_liquidity(asset_x, asset_y, amount_x, amount_y, recipient);
        self.or_revert(result)
    }

    /// Mint liquidity to the fee recipient, standing in for accrued trading fees.
    pub fn mint_fee(&mut self, pair: Address, amount: U256) {
        let fee_to = match self.fee_to.get() {
            Some(fee_to) => fee_to,
            None => self.env().revert(FarmError::NotInitialized),
        };
        LedgerContractRef::new(self.env(), pair).mint(fee_to, amount);
    }

    pub fn burn_liquidity(&mut self, pair: Address, amount: U256, recipient: Address) -> (U256, U256) {
        let result = self.process_burn(pair, amount, recipient);
        self.or_revert(result)
    }

    pub fn swap(
        &mut self,
        path: Vec<Address>,
        amount_in: U256,
        min_amount_out: U256,
        recipient: Address,
    ) -> U256 {
        let result = self.process_swap(path, amount_in, min_amount_out, recipient);
        self.or_revert(result)
    }
}

impl MockExchange {
    fn process_add_liquidity(
        &mut self,
        asset_x: Address,
        asset_y: Address,
        amount_x: U256,
        amount_y: U256,
        recipient: Address,
    ) -> Result<U256, FarmError> {
        let pair = self.get_pair(asset_x, asset_y).ok_or(FarmError::InvalidAsset)?;
        let (first, second) = self.pair_assets(pair);
        let (amount_first, amount_second) = if first == asset_x {
            (amount_x, amount_y)
        } else {
            (amount_y, amount_x)
        };

        let caller = self.env().caller();
        let this = self.env().self_address();
        LedgerContractRef::new(self.env(), first).transfer_from(caller, this, amount_first);
        LedgerContractRef::new(self.env(), second).transfer_from(caller, this, amount_second);

        let (reserve_first, reserve_second) = self.pair_reserves(pair);
        let mut liquidity_token = LedgerContractRef::new(self.env(), pair);
        let supply = liquidity_token.total_supply();
        let liquidity = if supply.is_zero() {
            amount_first.try_mul(amount_second)?.integer_sqrt()
        } else {
            mul_div(amount_first, supply, reserve_first)?
                .min(mul_div(amount_second, supply, reserve_second)?)
        };
        if liquidity.is_zero() {
            return Err(FarmError::InsufficientBalance);
        }

        self.reserves.set(
            &pair,
            (
                reserve_first.try_add(amount_first)?,
                reserve_second.try_add(amount_second)?,
            ),
        );
        liquidity_token.mint(recipient, liquidity);
        Ok(liquidity)
    }

    fn process_burn(
        &mut self,
        pair: Address,
        amount: U256,
        recipient: Address,
    ) -> Result<(U256, U256), FarmError> {
        let (first, second) = self.assets.get(&pair).ok_or(FarmError::InvalidAsset)?;
        let (reserve_first, reserve_second) = self.pair_reserves(pair);
        let mut liquidity_token = LedgerContractRef::new(self.env(), pair);
        let supply = liquidity_token.total_supply();
        if supply.is_zero() || amount.is_zero() {
            return Err(FarmError::NoLiquidityToConvert);
        }

        let out_first = mul_div(amount, reserve_first, supply)?;
        let out_second = mul_div(amount, reserve_second, supply)?;
        let this = self.env().self_address();
        liquidity_token.transfer_from(self.env().caller(), this, amount);
        liquidity_token.burn(this, amount);
        self.reserves.set(
            &pair,
            (
                reserve_first.try_sub(out_first)?,
                reserve_second.try_sub(out_second)?,
            ),
        );

        LedgerContractRef::new(self.env(), first).transfer(recipient, out_first);
        LedgerContractRef::new(self.env(), second).transfer(recipient, out_second);
        Ok((out_first, out_second))
    }

    fn process_swap(
        &mut self,
        path: Vec<Address>,
        amount_in: U256,
        min_amount_out: U256,
        recipient: Address,
    ) -> Result<U256, FarmError> {
        if path.len() < 2 {
            return Err(FarmError::InvalidPath);
        }
        let this = self.env().self_address();
        LedgerContractRef::new(self.env(), path[0]).transfer_from(
            self.env().caller(),
            this,
            amount_in,
        );

        let mut amount = amount_in;
        for hop in path.windows(2) {
            let pair = self.get_pair(hop[0], hop[1]).ok_or(FarmError::NoRoute)?;
            let (first, _) = self.pair_assets(pair);
            let (reserve_first, reserve_second) = self.pair_reserves(pair);
            let input_is_first = first == hop[0];
            let (reserve_in, reserve_out) = if input_is_first {
                (reserve_first, reserve_second)
            } else {
                (reserve_second, reserve_first)
            };

            let out = amount_out(amount, reserve_in, reserve_out)?;
            let new_in = reserve_in.try_add(amount)?;
            let new_out = reserve_out.try_sub(out)?;
            let updated = if input_is_first {
                (new_in, new_out)
            } else {
                (new_out, new_in)
            };
            self.reserves.set(&pair, updated);
            amount = out;
        }

        if amount < min_amount_out {
            return Err(FarmError::SlippageExceeded);
        }
        let last = path[path.len() - 1];
        LedgerContractRef::new(self.env(), last).transfer(recipient, amount);
        Ok(amount)
    }

    fn or_revert<T>(&self, result: Result<T, FarmError>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.env().revert(err),
        }
    }
}

/// Constant-product output after the 0.3% fee.
fn amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256, FarmError> {
    let with_fee = amount_in.try_mul(FEE_NUMERATOR)?;
    let numerator = with_fee.try_mul(reserve_out)?;
    let denominator = reserve_in.try_mul(FEE_DENOMINATOR)?.try_add(with_fee)?;
    if denominator.is_zero() {
        return Err(FarmError::NoRoute);
    }
    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_respects_fee_and_curve() {
        let out = amount_out(
            U256::from(100u64),
            U256::from(1_000u64),
            U256::from(1_000u64),
        )
        .unwrap();
        // 99_700_000 / 1_099_700
        assert_eq!(out, U256::from(90u64));
    }
}
