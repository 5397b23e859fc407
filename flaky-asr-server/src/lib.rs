//! Flaky ASR server
//!
//! Serves `GET /get-asr-output?path=<id>` on top of the simulation core:
//! admission control in front, then jittered latency, transcript lookup and
//! failure injection, answered as JSON.

pub mod handler;
pub mod startup;

// Re-export main components
pub use handler::{get_asr_output, AsrOutput, AsrQuery, RequestHandler, RequestPhase};
pub use startup::{build_router, Server, ASR_OUTPUT_ROUTE};
