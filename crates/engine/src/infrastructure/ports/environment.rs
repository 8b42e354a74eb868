//! Time and entropy, injected so sessions and prompts stay deterministic in tests.

use chrono::{DateTime, Utc};

/// Wall-clock source for session timestamps and idle pruning.
#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomPort: Send + Sync {
    /// Sampling seed attached to a completion request.
    fn gen_seed(&self) -> u64;
}
