//! Fixed-interval, bounded polling.
//!
//! A [`PollTicker`] hands out "you may check now" permits: each call to
//! [`PollTicker::tick`] sleeps one interval first, then counts it. Ticks are
//! granted while the counter is still `<=` the budget, so a budget of `n`
//! ticks yields `n + 1` checks and the first check happens one interval after
//! the start, never at time zero. There is no backoff and no jitter.
//!
//! The ticker is plain async state; dropping the future that drives it stops
//! the polling.

use std::time::Duration;
use tokio::time::sleep;

/// Interval and tick budget for a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub max_ticks: u64,
}

impl PollSchedule {
    /// Budget expressed as wall-clock time, rounded up to whole intervals.
    ///
    /// `interval` must be non-zero.
    pub fn from_timeout(interval: Duration, timeout: Duration) -> Self {
        let step = interval.as_nanos().max(1);
        let ticks = timeout.as_nanos().div_ceil(step);
        Self {
            interval,
            max_ticks: u64::try_from(ticks).unwrap_or(u64::MAX),
        }
    }

    /// Upper bound on the number of checks this schedule allows.
    pub fn max_checks(&self) -> u64 {
        self.max_ticks.saturating_add(1)
    }

    pub fn ticker(&self) -> PollTicker {
        PollTicker {
            schedule: *self,
            elapsed: 0,
        }
    }
}

/// Counter driving one polling loop.
#[derive(Debug)]
pub struct PollTicker {
    schedule: PollSchedule,
    elapsed: u64,
}

impl PollTicker {
    /// Sleep one interval and return `true`, or return `false` without
    /// sleeping once the budget is spent.
    pub async fn tick(&mut self) -> bool {
        if self.elapsed > self.schedule.max_ticks {
            return false;
        }
        sleep(self.schedule.interval).await;
        self.elapsed += 1;
        true
    }

    /// Ticks granted so far.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}
