//! Artificial response latency
//!
//! Each request waits `base_delay + u * jitter` with `u` drawn uniformly from
//! `[0, 1)`. The wait is a plain tokio sleep, so dropping the request future
//! (client gone) cancels it on the spot.

use std::time::Duration;

use log::trace;

use crate::random::SharedRandom;

/// Computes and applies jittered delays
#[derive(Clone)]
pub struct LatencySimulator {
    base_delay: Duration,
    jitter: Duration,
    random: SharedRandom,
}

impl LatencySimulator {
    pub fn new(base_delay: Duration, jitter: Duration, random: SharedRandom) -> Self {
        Self {
            base_delay,
            jitter,
            random,
        }
    }

    /// Draw the delay for one request
    pub fn compute_delay(&self) -> Duration {
        let draw = self.random.next_unit();
        self.base_delay + self.jitter.mul_f64(draw)
    }

    /// Suspend for `delay`
    pub async fn await_delay(&self, delay: Duration) {
        trace!("Delaying response by {:?}", delay);
        tokio::time::sleep(delay).await;
    }

    /// Draw a delay and wait for it, returning what was waited
    pub async fn delay(&self) -> Duration {
        let delay = self.compute_delay();
        self.await_delay(delay).await;
        delay
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn jitter(&self) -> Duration {
        self.jitter
    }
}

impl std::fmt::Debug for LatencySimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatencySimulator")
            .field("base_delay", &self.base_delay)
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}
