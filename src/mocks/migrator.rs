use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::FarmError;
use crate::ledger::LedgerContractRef;

/// Migration custodian that swaps collateral 1:1 for a pre-registered
/// replacement ledger, optionally keeping back `shortfall` units.
#[odra::module(errors = FarmError)]
pub struct MockMigrator {
    scheduler: Var<Address>,
    replacements: Mapping<Address, Address>,
    shortfall: Var<U256>,
}

#[odra::module]
impl MockMigrator {
    pub fn init(&mut self, scheduler: Address) {
        self.scheduler.set(scheduler);
        self.shortfall.set(U256::zero());
    }

    /// `replacement` must already list this contract as its minter.
    pub fn register_replacement(&mut self, asset: Address, replacement: Address) {
        self.replacements.set(&asset, replacement);
    }

    pub fn set_shortfall(&mut self, shortfall: U256) {
        self.shortfall.set(shortfall);
    }

    pub fn migrate(&mut self, asset: Address, amount: U256) -> Address {
        let caller = self.env().caller();
        if self.scheduler.get() != Some(caller) {
            self.env().revert(FarmError::Unauthorized);
        }
        let replacement = match self.replacements.get(&asset) {
            Some(replacement) => replacement,
            None => self.env().revert(FarmError::InvalidAsset),
        };

        LedgerContractRef::new(self.env(), asset).transfer_from(
            caller,
            self.env().self_address(),
            amount,
        );
        let delivered = amount.saturating_sub(self.shortfall.get_or_default());
        LedgerContractRef::new(self.env(), replacement).mint(caller, delivered);
        replacement
    }
}
