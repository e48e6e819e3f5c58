// Persistent records owned by the farm contracts

/// Emission parameters
pub mod schedule;
/// Pool records
pub mod stake_pool;
/// Per-account stake records
pub mod stake_position;
/// Block time to tick mapping
pub mod tick_clock;

pub use schedule::*;
pub use stake_pool::*;
pub use stake_position::*;
pub use tick_clock::*;

/// Each accrual also mints `emission / DEV_SHARE_DIVISOR` to the dev address
pub const DEV_SHARE_DIVISOR: u64 = 10;

/// Smallest acceptable output for a single conversion swap
pub const MIN_SWAP_OUTPUT: u64 = 1;
