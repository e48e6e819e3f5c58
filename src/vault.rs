//! Share vault.
//!
//! Holders park the reward asset and receive shares of the vault's held
//! balance. Revenue arriving without a share mint raises the value of every
//! outstanding share.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::FarmError;
use crate::ledger::{Ledger, LedgerContractRef};
use crate::math::share::{payout_for_shares, shares_for_deposit};

/// Reward asset locked for shares.
#[odra::event]
pub struct Entered {
    /// Share holder
    pub account: Address,
    /// Reward asset units
    pub amount: U256,
    /// Share units
    pub shares: U256,
}

/// Shares burned for reward asset.
#[odra::event]
pub struct Left {
    /// Share holder
    pub account: Address,
    /// Share units
    pub shares: U256,
    /// Reward asset units
    pub amount: U256,
}

/// Reward asset added without minting shares.
#[odra::event]
pub struct RevenueDistributed {
    /// Payer
    pub from: Address,
    /// Reward asset units
    pub amount: U256,
}

/// Issues shares over a growing reward-asset balance.
#[odra::module(events = [Entered, Left, RevenueDistributed], errors = FarmError)]
pub struct ShareVault {
    reward_asset: Var<Address>,
    shares: SubModule<Ledger>,
}

#[odra::module]
impl ShareVault {
    /// Create the vault and its share class.
    pub fn init(&mut self, reward_asset: Address, share_name: String, share_symbol: String) {
        self.reward_asset.set(reward_asset);
        let this = self.env().self_address();
        self.shares.init(share_name, share_symbol, this);
    }

    /// Lock `amount` of the reward asset and mint shares priced against the
    /// balance held before this deposit.
    pub fn deposit(&mut self, amount: U256) -> U256 {
        let result = self.process_deposit(amount);
        self.or_revert(result)
    }

    /// Burn `shares` for their slice of the held balance.
    pub fn withdraw(&mut self, shares: U256) -> U256 {
        let result = self.process_withdraw(shares);
        self.or_revert(result)
    }

    /// Pull `amount` of the reward asset from the caller without minting shares.
    pub fn distribute_revenue(&mut self, amount: U256) {
        let from = self.env().caller();
        let this = self.env().self_address();
        let mut reward = self.reward();
        reward.transfer_from(from, this, amount);
        log::info!("vault revenue {} from {:?}", amount, from);
        self.env().emit_event(RevenueDistributed { from, amount });
    }

    /// Move shares from the caller to `recipient`.
    pub fn transfer_shares(&mut self, recipient: Address, amount: U256) {
        let caller = self.env().caller();
        let result = self
            .shares
            .raw_transfer(caller, recipient, amount)
            .map_err(|err| match err {
                FarmError::InsufficientBalance => FarmError::InsufficientShares,
                other => other,
            });
        self.or_revert(result)
    }

    /// Shares held by `owner`
    pub fn share_balance_of(&self, owner: Address) -> U256 {
        self.shares.balance_of(owner)
    }

    /// Shares outstanding
    pub fn total_shares(&self) -> U256 {
        self.shares.total_supply()
    }

    /// Reward asset currently in vault custody
    pub fn held_balance(&self) -> U256 {
        self.reward().balance_of(self.env().self_address())
    }

    /// Ledger of the vaulted asset
    pub fn reward_asset(&self) -> Option<Address> {
        self.reward_asset.get()
    }
}

impl ShareVault {
    fn process_deposit(&mut self, amount: U256) -> Result<U256, FarmError> {
        let account = self.env().caller();
        let this = self.env().self_address();
        let mut reward = self.reward();
        if reward.balance_of(account) < amount {
            return Err(FarmError::InsufficientBalance);
        }

        let held = reward.balance_of(this);
        let minted = shares_for_deposit(amount, self.shares.total_supply(), held)?;
        if minted.is_zero() {
            return Err(FarmError::ZeroSharesMinted);
        }

        reward.transfer_from(account, this, amount);
        self.shares.raw_mint(account, minted)?;
        log::debug!("vault deposit {} -> {} shares", amount, minted);
        self.env().emit_event(Entered {
            account,
            amount,
            shares: minted,
        });
        Ok(minted)
    }

    fn process_withdraw(&mut self, shares: U256) -> Result<U256, FarmError> {
        let account = self.env().caller();
        if self.shares.balance_of(account) < shares {
            return Err(FarmError::InsufficientShares);
        }

        let mut reward = self.reward();
        let held = reward.balance_of(self.env().self_address());
        let payout = payout_for_shares(shares, self.shares.total_supply(), held)?;
        self.shares.raw_burn(account, shares)?;
        reward.transfer(account, payout);
        log::debug!("vault withdraw {} shares -> {}", shares, payout);
        self.env().emit_event(Left {
            account,
            shares,
            amount: payout,
        });
        Ok(payout)
    }

    fn reward(&self) -> LedgerContractRef {
        match self.reward_asset.get() {
            Some(asset) => LedgerContractRef::new(self.env(), asset),
            None => self.env().revert(FarmError::NotInitialized),
        }
    }

    fn or_revert<T>(&self, result: Result<T, FarmError>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.env().revert(err),
        }
    }
}
