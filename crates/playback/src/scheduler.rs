//! Rate Scheduler - fixed-delay pacing on the monotonic clock

use std::time::Duration;

use contracts::{ContractError, RateSpec};
use tokio::time::Instant;
use tracing::trace;

/// Yields control once per interval
///
/// The first `wait_next` returns immediately. Every later call sleeps one full
/// interval measured from the moment it is called, so time spent by the caller
/// between calls is added on top and never caught up.
#[derive(Debug)]
pub struct RateScheduler {
    interval: Duration,
    last_tick: Option<Instant>,
    ticks: u64,
}

impl RateScheduler {
    /// Create from a validated rate
    pub fn new(rate: RateSpec) -> Self {
        Self {
            interval: rate.interval(),
            last_tick: None,
            ticks: 0,
        }
    }

    /// Create from an explicit interval
    ///
    /// # Errors
    /// `Configuration` if `interval` is zero.
    pub fn from_interval(interval: Duration) -> Result<Self, ContractError> {
        if interval.is_zero() {
            return Err(ContractError::configuration(
                "interval",
                "interval must be > 0",
            ));
        }
        Ok(Self {
            interval,
            last_tick: None,
            ticks: 0,
        })
    }

    /// Wait until the next emission slot
    pub async fn wait_next(&mut self) {
        if self.last_tick.is_some() {
            tokio::time::sleep(self.interval).await;
        }

        let now = Instant::now();
        if let Some(last) = self.last_tick {
            trace!(
                gap_us = now.duration_since(last).as_micros() as u64,
                interval_us = self.interval.as_micros() as u64,
                "tick"
            );
        }
        self.last_tick = Some(now);
        self.ticks += 1;
    }

    /// Configured interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of completed `wait_next` calls
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// When the last `wait_next` returned
    pub fn last_tick(&self) -> Option<Instant> {
        self.last_tick
    }
}
