//! Flaky ASR simulation core
//!
//! This crate provides the pieces that make the simulated speech-recognition
//! backend unreliable on purpose: jittered latency, random and per-item
//! failure injection, and admission control over concurrent requests.
//! It knows nothing about HTTP.

pub mod admission;
pub mod error;
pub mod failure;
pub mod latency;
pub mod random;
pub mod transcripts;

// Re-export commonly used types
pub use admission::{AdmissionController, AdmissionPermit, AdmissionStats};
pub use error::{FailureCause, SimulationError, SimulationResult};
pub use failure::FailureInjector;
pub use latency::LatencySimulator;
pub use random::{RandomSource, ScriptedRandom, SeededRandom, SharedRandom, ThreadRandom};
pub use transcripts::{TranscriptRecord, TranscriptStore};
