//! Flaky backend behaviour: latency, failure rate and admission limit

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_probability, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Minimum artificial delay before every response
    #[serde(
        rename = "base_delay_ms",
        with = "crate::domains::utils::serde_duration_ms",
        default = "default_base_delay"
    )]
    pub base_delay: Duration,

    /// Upper bound of the uniform jitter added on top of `base_delay`
    #[serde(
        rename = "delay_jitter_ms",
        with = "crate::domains::utils::serde_duration_ms",
        default = "default_delay_jitter"
    )]
    pub delay_jitter: Duration,

    /// Probability in `[0, 1]` that a found record fails anyway
    #[serde(default = "default_failure_probability")]
    pub failure_probability: f64,

    /// Maximum number of requests in flight at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Seed for the random source; unset means OS-seeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_delay: default_base_delay(),
            delay_jitter: default_delay_jitter(),
            failure_probability: default_failure_probability(),
            max_concurrent_requests: default_max_concurrent_requests(),
            seed: None,
        }
    }
}

impl Validatable for SimulationConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_probability(
            self.failure_probability,
            "failure_probability",
            self.domain_name(),
        )?;
        validate_positive(
            self.max_concurrent_requests,
            "max_concurrent_requests",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "simulation"
    }
}

fn default_base_delay() -> Duration {
    Duration::from_millis(5_000)
}

fn default_delay_jitter() -> Duration {
    Duration::from_millis(5_000)
}

fn default_failure_probability() -> f64 {
    1.0 / 20.0
}

fn default_max_concurrent_requests() -> usize {
    100
}
