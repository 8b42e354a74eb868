//! Production and fixed implementations of the environment ports.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// Seeds are drawn from `0..SEED_RANGE`.
pub const SEED_RANGE: u64 = 1_000_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Thread-local RNG; a new seed on every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomPort for SystemRandom {
    fn gen_seed(&self) -> u64 {
        rand::thread_rng().gen_range(0..SEED_RANGE)
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Always hands out the same seed.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub u64);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_seed(&self) -> u64 {
        self.0
    }
}
