//! Injectable sources of uniform randomness
//!
//! Latency jitter and random failures both draw from a [`RandomSource`] so
//! that tests can replace the process-wide rng with a fixed sequence.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A source of uniform draws in `[0, 1)`
pub trait RandomSource: Send + Sync {
    /// Draw the next value in `[0, 1)`
    fn next_unit(&self) -> f64;
}

/// Shared handle to a random source
pub type SharedRandom = Arc<dyn RandomSource>;

/// Thread-local, OS-seeded rng. The default for a running server.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Deterministic rng seeded once, for reproducible runs
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        self.rng.lock().random::<f64>()
    }
}

/// Replays a fixed sequence of draws, wrapping around at the end
///
/// Values outside `[0, 1)` are clamped into range. An empty script always
/// yields `0.0`.
#[derive(Debug)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// A script that always returns the same value
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws taken so far
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let index = self.cursor.fetch_add(1, Ordering::SeqCst) % self.values.len();
        self.values[index].clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Build the random source used by a server: seeded when a seed is given,
/// thread-local otherwise
pub fn from_seed(seed: Option<u64>) -> SharedRandom {
    match seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    }
}
