//! Countdowns and tick sources
//!
//! Time inside a session moves in whole one-second ticks. Who produces the
//! ticks is pluggable: the terminal runner uses the wall clock, tests hand
//! them out explicitly.

use std::time::{Duration, Instant};

/// Seconds left on a rest or active countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self { remaining: secs }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// One second elapsed. Returns true once it hits zero.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

pub trait TickSource {
    /// Whole ticks elapsed since the previous poll
    fn poll_ticks(&mut self) -> u32;
}

/// Wall-clock ticks, one per second
#[derive(Debug)]
pub struct WallTicks {
    last: Instant,
    period: Duration,
}

impl WallTicks {
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            last: Instant::now(),
            period,
        }
    }

    /// Drop partial progress, e.g. after the session was idle in a prompt
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for WallTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for WallTicks {
    fn poll_ticks(&mut self) -> u32 {
        let elapsed = self.last.elapsed();
        let period = self.period.as_nanos().max(1);
        let ticks = (elapsed.as_nanos() / period).min(u32::MAX as u128) as u32;
        if ticks > 0 {
            // keep the remainder so ticks don't drift
            self.last += self.period * ticks;
        }
        ticks
    }
}

/// Ticks handed out by the caller
#[derive(Debug, Default)]
pub struct ManualTicks {
    pending: u32,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ticks: u32) {
        self.pending = self.pending.saturating_add(ticks);
    }
}

impl TickSource for ManualTicks {
    fn poll_ticks(&mut self) -> u32 {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_reaches_zero_after_n_ticks() {
        let mut countdown = Countdown::new(3);
        assert!(!countdown.tick());
        assert!(!countdown.tick());
        assert!(countdown.tick());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_countdown_saturates() {
        let mut countdown = Countdown::new(0);
        assert!(countdown.tick());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_manual_ticks_drain() {
        let mut ticks = ManualTicks::new();
        assert_eq!(ticks.poll_ticks(), 0);
        ticks.advance(2);
        ticks.advance(3);
        assert_eq!(ticks.poll_ticks(), 5);
        assert_eq!(ticks.poll_ticks(), 0);
    }

    #[test]
    fn test_wall_ticks_counts_elapsed_periods() {
        let mut ticks = WallTicks::with_period(Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(12));
        let first = ticks.poll_ticks();
        assert!(first >= 2, "got {}", first);
    }

    #[test]
    fn test_wall_ticks_reset_drops_progress() {
        let mut ticks = WallTicks::new();
        ticks.reset();
        assert_eq!(ticks.poll_ticks(), 0);
    }
}
