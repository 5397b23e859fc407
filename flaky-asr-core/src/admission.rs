//! Admission control over concurrent in-flight requests
//!
//! The controller owns a single in-flight counter. A request is admitted only
//! while `in_flight + 1 <= max_concurrent`; anything beyond that is rejected
//! up front, before any simulated work starts. Admitted requests hold an
//! [`AdmissionPermit`] whose drop releases the slot, so every exit path
//! (response, error, cancellation) gives the slot back exactly once.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::error::SimulationError;

/// Tracks and bounds the number of in-flight requests
#[derive(Debug)]
pub struct AdmissionController {
    max_concurrent: usize,
    in_flight: AtomicUsize,
    admitted_total: AtomicU64,
    rejected_total: AtomicU64,
}

/// Admission statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionStats {
    pub max_concurrent: usize,
    pub in_flight: usize,
    pub admitted_total: u64,
    pub rejected_total: u64,
}

impl AdmissionController {
    /// Create a controller admitting at most `max_concurrent` requests at once
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent,
            in_flight: AtomicUsize::new(0),
            admitted_total: AtomicU64::new(0),
            rejected_total: AtomicU64::new(0),
        }
    }

    /// Try to take a slot. Returns `false` without touching the counter when
    /// the controller is saturated.
    pub fn try_admit(&self) -> bool {
        let result = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current
                    .checked_add(1)
                    .filter(|next| *next <= self.max_concurrent)
            });

        match result {
            Ok(previous) => {
                self.admitted_total.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Admitted request ({}/{} in flight)",
                    previous + 1,
                    self.max_concurrent
                );
                true
            }
            Err(current) => {
                self.rejected_total.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Rejected request: {}/{} already in flight",
                    current, self.max_concurrent
                );
                false
            }
        }
    }

    /// Give a slot back. The counter never drops below zero; a release with
    /// nothing in flight is tolerated and reported as `false`.
    pub fn release(&self) -> bool {
        let result = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_sub(1)
            });

        match result {
            Ok(previous) => {
                debug!(
                    "Released slot ({}/{} in flight)",
                    previous - 1,
                    self.max_concurrent
                );
                true
            }
            Err(_) => {
                debug!("Release with no requests in flight, ignoring");
                false
            }
        }
    }

    /// Admit a request and return a guard that releases its slot on drop
    pub fn admit(self: &Arc<Self>) -> Result<AdmissionPermit, SimulationError> {
        if self.try_admit() {
            Ok(AdmissionPermit {
                controller: Arc::clone(self),
            })
        } else {
            Err(SimulationError::CapacityExceeded {
                limit: self.max_concurrent,
            })
        }
    }

    /// Current number of in-flight requests
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Configured concurrency limit
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Slots still free right now
    pub fn available(&self) -> usize {
        self.max_concurrent.saturating_sub(self.in_flight())
    }

    pub fn stats(&self) -> AdmissionStats {
        AdmissionStats {
            max_concurrent: self.max_concurrent,
            in_flight: self.in_flight(),
            admitted_total: self.admitted_total.load(Ordering::Relaxed),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
        }
    }
}

/// Holds one admission slot for the lifetime of a request
#[derive(Debug)]
#[must_use = "dropping the permit releases the slot immediately"]
pub struct AdmissionPermit {
    controller: Arc<AdmissionController>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.controller.release();
    }
}
