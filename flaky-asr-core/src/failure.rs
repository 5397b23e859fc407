//! Failure injection policy
//!
//! Records flagged `always_fails` fail unconditionally. Every other record
//! fails with the configured probability, using a fresh draw per request.

use log::debug;

use crate::error::FailureCause;
use crate::random::SharedRandom;
use crate::transcripts::TranscriptRecord;

/// Decides whether a looked-up request should fail
#[derive(Clone)]
pub struct FailureInjector {
    probability: f64,
    random: SharedRandom,
}

impl FailureInjector {
    /// `probability` is clamped into `[0, 1]`
    pub fn new(probability: f64, random: SharedRandom) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            random,
        }
    }

    /// Decide the fate of a request for `record`, returning the cause when it
    /// should fail
    pub fn decide(&self, record: &TranscriptRecord) -> Option<FailureCause> {
        if record.always_fails {
            debug!("Record '{}' is flagged to always fail", record.id);
            return Some(FailureCause::AlwaysFails);
        }

        let draw = self.random.next_unit();
        if draw < self.probability {
            debug!(
                "Random failure for '{}' (draw {:.4} < {:.4})",
                record.id, draw, self.probability
            );
            Some(FailureCause::Random)
        } else {
            None
        }
    }

    pub fn should_fail(&self, record: &TranscriptRecord) -> bool {
        self.decide(record).is_some()
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl std::fmt::Debug for FailureInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureInjector")
            .field("probability", &self.probability)
            .finish_non_exhaustive()
    }
}
