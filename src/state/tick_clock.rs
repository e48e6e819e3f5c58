/// Maps the host's millisecond block clock onto discrete emission ticks.
#[odra::odra_type]
pub struct TickClock {
    /// Block time at which tick 0 starts
    pub genesis_time: u64,
    /// Length of one tick in milliseconds
    pub tick_duration: u64,
}

impl TickClock {
    /// Create a clock starting at `genesis_time`
    pub fn new(genesis_time: u64, tick_duration: u64) -> Self {
        Self {
            genesis_time,
            tick_duration: tick_duration.max(1),
        }
    }

    /// Tick containing `block_time`; times before genesis map to tick 0
    pub fn tick_at(&self, block_time: u64) -> u64 {
        block_time.saturating_sub(self.genesis_time) / self.tick_duration.max(1)
    }
}
