//! Simulation error taxonomy

use thiserror::Error;

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Why a failure was injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// The record is flagged to fail on every request
    AlwaysFails,
    /// The random failure draw came up
    Random,
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::AlwaysFails => write!(f, "always-fails"),
            FailureCause::Random => write!(f, "random"),
        }
    }
}

/// Outcomes that end a simulated request without a transcript
///
/// A client disconnect is not represented here: it produces no response and
/// only needs the admission slot back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Admission rejected because the in-flight limit is reached
    #[error("Capacity exceeded: limit of {limit} concurrent requests reached")]
    CapacityExceeded { limit: usize },

    /// Unknown identifier
    #[error("No transcript for '{path}'")]
    NotFound { path: String },

    /// Injected backend failure
    #[error("Simulated failure for '{path}' ({cause})")]
    SimulatedFailure { path: String, cause: FailureCause },
}
