//! Logging setup for the flaky ASR simulator
//!
//! All crates log through `tracing` (or `log`, bridged by the subscriber);
//! this crate only installs the global subscriber from configuration.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
