//! Fungible balance book backing every asset class in the farm.
//!
//! The reward asset, staked collateral and exchange liquidity positions are
//! all deployed `Ledger` contracts; the share vault embeds one as its share
//! class. Balances never go negative: every debit is checked before it is
//! written.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::FarmError;
use crate::math::{TryAdd, TrySub};

/// Balance movement; `from == None` is a mint, `to == None` a burn.
#[odra::event]
pub struct Transfer {
    /// Debited account
    pub from: Option<Address>,
    /// Credited account
    pub to: Option<Address>,
    /// Units moved
    pub amount: U256,
}

/// Allowance set by `owner` for `spender`.
#[odra::event]
pub struct Approval {
    /// Account whose balance may be spent
    pub owner: Address,
    /// Account allowed to spend
    pub spender: Address,
    /// Allowed units
    pub amount: U256,
}

/// Fungible balance book for one asset class.
#[odra::module(events = [Transfer, Approval], errors = FarmError)]
pub struct Ledger {
    name: Var<String>,
    symbol: Var<String>,
    minter: Var<Address>,
    total_supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl Ledger {
    /// Create an empty ledger whose supply is controlled by `minter`.
    pub fn init(&mut self, name: String, symbol: String, minter: Address) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.minter.set(minter);
        self.total_supply.set(U256::zero());
    }

    /// Display name
    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    /// Ticker symbol
    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    /// Account allowed to mint and burn
    pub fn minter(&self) -> Option<Address> {
        self.minter.get()
    }

    /// Units in circulation
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    /// Units held by `owner`
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get_or_default(&owner)
    }

    /// Units `spender` may still move out of `owner`
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get_or_default(&(owner, spender))
    }

    /// Move `amount` from the caller to `recipient`.
    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let caller = self.env().caller();
        if let Err(err) = self.raw_transfer(caller, recipient, amount) {
            self.env().revert(err);
        }
    }

    /// Let `spender` move up to `amount` of the caller's balance.
    pub fn approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        self.env().emit_event(Approval {
            owner,
            spender,
            amount,
        });
    }

    /// Move `amount` out of `owner`, spending the caller's allowance.
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        let allowed = self.allowance(owner, spender);
        if allowed < amount {
            self.env().revert(FarmError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), allowed - amount);
        if let Err(err) = self.raw_transfer(owner, recipient, amount) {
            self.env().revert(err);
        }
    }

    /// Create `amount` new units for `to`. Minter only.
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.assert_minter();
        if let Err(err) = self.raw_mint(to, amount) {
            self.env().revert(err);
        }
    }

    /// Destroy `amount` units held by `from`. Minter only.
    pub fn burn(&mut self, from: Address, amount: U256) {
        self.assert_minter();
        if let Err(err) = self.raw_burn(from, amount) {
            self.env().revert(err);
        }
    }

    /// Hand mint authority to another account (e.g. the emission scheduler).
    pub fn set_minter(&mut self, new_minter: Address) {
        self.assert_minter();
        self.minter.set(new_minter);
    }
}

impl Ledger {
    /// Mint without the minter check, for modules embedding a ledger.
    pub fn raw_mint(&mut self, to: Address, amount: U256) -> Result<(), FarmError> {
        let supply = self.total_supply().try_add(amount)?;
        let balance = self.balance_of(to).try_add(amount)?;
        self.total_supply.set(supply);
        self.balances.set(&to, balance);
        self.env().emit_event(Transfer {
            from: None,
            to: Some(to),
            amount,
        });
        Ok(())
    }

    /// Burn without the minter check.
    pub fn raw_burn(&mut self, from: Address, amount: U256) -> Result<(), FarmError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(FarmError::InsufficientBalance);
        }
        let supply = self.total_supply().try_sub(amount)?;
        self.balances.set(&from, balance - amount);
        self.total_supply.set(supply);
        self.env().emit_event(Transfer {
            from: Some(from),
            to: None,
            amount,
        });
        Ok(())
    }

    /// Move balance between two accounts without any caller check.
    pub fn raw_transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), FarmError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(FarmError::InsufficientBalance);
        }
        if from != to {
            let to_balance = self.balance_of(to).try_add(amount)?;
            self.balances.set(&from, from_balance - amount);
            self.balances.set(&to, to_balance);
        }
        self.env().emit_event(Transfer {
            from: Some(from),
            to: Some(to),
            amount,
        });
        Ok(())
    }

    fn assert_minter(&self) {
        if self.minter.get() != Some(self.env().caller()) {
            self.env().revert(FarmError::Unauthorized);
        }
    }
}
