//! ASR output endpoint
//!
//! Per-request flow once admission has let the request in:
//!
//! ```text
//! Admitted -> Delaying -> LookedUp -> Decided -> Responded
//!                |
//!                +-> Aborted (client gone, future dropped)
//! ```
//!
//! Admission itself (and the `Rejected` outcome) lives in the admission
//! middleware, which also owns the slot release.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    Json,
};
use flaky_asr_config::SimulationConfig;
use flaky_asr_core::{
    random::{self, SharedRandom},
    FailureInjector, LatencySimulator, SimulationError, SimulationResult, TranscriptStore,
};
use flaky_asr_web::{RequestId, WebResult};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Query parameters of `GET /get-asr-output`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsrQuery {
    pub path: Option<String>,
}

impl AsrQuery {
    /// Pick the identifier out of raw query pairs
    ///
    /// Only a single `path` value names an item. A missing or repeated `path`
    /// leaves no identifier, which the handler answers like an unknown one.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut values = pairs.into_iter().filter(|(key, _)| key == "path").map(|(_, value)| value);
        let path = match (values.next(), values.next()) {
            (Some(value), None) => Some(value),
            _ => None,
        };
        Self { path }
    }
}

/// Successful response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsrOutput {
    pub path: String,
    pub transcript: String,
}

/// Where an admitted request currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Admitted,
    Delaying,
    LookedUp,
    Decided,
    Responded,
    Aborted,
}

impl RequestPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestPhase::Responded | RequestPhase::Aborted)
    }
}

impl std::fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestPhase::Admitted => "admitted",
            RequestPhase::Delaying => "delaying",
            RequestPhase::LookedUp => "looked-up",
            RequestPhase::Decided => "decided",
            RequestPhase::Responded => "responded",
            RequestPhase::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}

/// Tracks the phase of one request and reports an abort if it is dropped
/// before responding
struct RequestLifecycle<'a> {
    request_id: &'a RequestId,
    path: &'a str,
    phase: RequestPhase,
    started: Instant,
}

impl<'a> RequestLifecycle<'a> {
    fn begin(request_id: &'a RequestId, path: &'a str) -> Self {
        debug!(%request_id, path, "Request admitted");
        Self {
            request_id,
            path,
            phase: RequestPhase::Admitted,
            started: Instant::now(),
        }
    }

    fn advance(&mut self, next: RequestPhase) {
        debug!(request_id = %self.request_id, path = self.path, from = %self.phase, to = %next, "Request phase change");
        self.phase = next;
    }

    fn respond(&mut self, result: &SimulationResult<AsrOutput>, delay: Duration) {
        self.advance(RequestPhase::Responded);
        let elapsed = self.started.elapsed();
        match result {
            Ok(_) => info!(request_id = %self.request_id, path = self.path, ?delay, ?elapsed, "Transcript served"),
            Err(err @ SimulationError::SimulatedFailure { .. }) => {
                warn!(request_id = %self.request_id, path = self.path, ?delay, ?elapsed, "{}", err)
            }
            Err(err) => info!(request_id = %self.request_id, path = self.path, ?delay, ?elapsed, "{}", err),
        }
    }
}

impl Drop for RequestLifecycle<'_> {
    fn drop(&mut self) {
        if !self.phase.is_terminal() {
            let interrupted = self.phase;
            self.phase = RequestPhase::Aborted;
            info!(
                request_id = %self.request_id,
                path = self.path,
                phase = %interrupted,
                elapsed = ?self.started.elapsed(),
                "Client disconnected, request aborted"
            );
        }
    }
}

/// Orchestrates latency, lookup and failure injection for admitted requests
#[derive(Debug, Clone)]
pub struct RequestHandler {
    store: Arc<TranscriptStore>,
    latency: LatencySimulator,
    failure: FailureInjector,
}

impl RequestHandler {
    pub fn new(store: Arc<TranscriptStore>, latency: LatencySimulator, failure: FailureInjector) -> Self {
        Self {
            store,
            latency,
            failure,
        }
    }

    /// Build a handler from configuration, sharing one random source between
    /// latency and failure draws
    pub fn from_config(config: &SimulationConfig, store: Arc<TranscriptStore>) -> Self {
        Self::with_random(config, store, random::from_seed(config.seed))
    }

    /// Build a handler from configuration with an explicit random source
    pub fn with_random(config: &SimulationConfig, store: Arc<TranscriptStore>, random: SharedRandom) -> Self {
        Self::new(
            store,
            LatencySimulator::new(config.base_delay, config.delay_jitter, random.clone()),
            FailureInjector::new(config.failure_probability, random),
        )
    }

    /// Run one admitted request to completion
    ///
    /// Dropping the returned future during the delay abandons the request;
    /// nothing after the delay runs.
    pub async fn handle(&self, request_id: &RequestId, path: &str) -> SimulationResult<AsrOutput> {
        let mut lifecycle = RequestLifecycle::begin(request_id, path);

        lifecycle.advance(RequestPhase::Delaying);
        let delay = self.latency.delay().await;

        let result = self.resolve(path, &mut lifecycle);
        lifecycle.respond(&result, delay);
        result
    }

    fn resolve(&self, path: &str, lifecycle: &mut RequestLifecycle<'_>) -> SimulationResult<AsrOutput> {
        let record = self.store.lookup(path).ok_or_else(|| SimulationError::NotFound {
            path: path.to_string(),
        })?;
        lifecycle.advance(RequestPhase::LookedUp);

        let failure = self.failure.decide(record);
        lifecycle.advance(RequestPhase::Decided);

        match failure {
            Some(cause) => Err(SimulationError::SimulatedFailure {
                path: path.to_string(),
                cause,
            }),
            None => Ok(AsrOutput {
                path: path.to_string(),
                transcript: record.text.clone(),
            }),
        }
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }
}

/// `GET /get-asr-output?path=<id>`
///
/// A missing or repeated `path` behaves like an unknown identifier: delayed, then 404.
pub async fn get_asr_output(
    State(handler): State<RequestHandler>,
    request_id: RequestId,
    Query(pairs): Query<Vec<(String, String)>>,
) -> WebResult<Json<AsrOutput>> {
    let path = AsrQuery::from_pairs(pairs).path.unwrap_or_default();
    let output = handler.handle(&request_id, &path).await?;
    Ok(Json(output))
}
