#![allow(clippy::arithmetic_side_effects)]
#![warn(missing_docs)]
#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

//! Liquidity incentive and fee-revenue contracts for the casper blockchain.
//!
//! - `scheduler`: per-tick reward emission across weighted stake pools
//! - `vault`: pooled shares over the reward asset
//! - `router`: converts collected trading-fee liquidity into vault revenue
//! - `ledger`: the fungible balance book every asset class is deployed as

extern crate alloc;

pub mod error;
pub mod exchange;
pub mod ledger;
/// Checked fixed-point arithmetic
pub mod math;
pub mod router;
pub mod scheduler;
/// Persistent records
pub mod state;
pub mod vault;

#[cfg(test)]
mod testing;
