//! Inter-request pacing for the deletion driver

use async_trait::async_trait;
use std::time::Duration;

/// Delay applied after a request the platform answered.
///
/// Kept separate from the driver so the rate policy can change on its own.
#[async_trait]
pub trait Pacer: Send {
    async fn pace(&mut self);
}

/// Sleep a fixed interval after each request
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Interval that keeps under `per_minute` requests per minute
    pub fn per_minute(per_minute: u32) -> Self {
        Self::new(Duration::from_secs(60) / per_minute.max(1))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedInterval {
    /// 1.02s: just under the deletion endpoint's 60/min allowance
    fn default() -> Self {
        Self::new(Duration::from_millis(1020))
    }
}

#[async_trait]
impl Pacer for FixedInterval {
    async fn pace(&mut self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// No delay; counts how often pacing was requested
#[derive(Debug, Clone, Copy, Default)]
pub struct Unpaced {
    pub paced: usize,
}

#[async_trait]
impl Pacer for Unpaced {
    async fn pace(&mut self) {
        self.paced += 1;
    }
}
