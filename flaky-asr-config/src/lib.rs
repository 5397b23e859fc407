//! Domain-driven configuration management for the flaky ASR simulator
//!
//! Configuration is split by functional domain (server, simulation, logging),
//! loaded from YAML or JSON, overridden from `FLAKY_ASR_*` environment
//! variables and validated before the server starts. It is read once and is
//! immutable afterwards.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    logging::{LogFormat, LogLevel, LoggingConfig},
    server::ServerConfig,
    simulation::SimulationConfig,
    FlakyAsrConfig,
};

// Re-export utilities
pub use domains::utils::serde_duration_ms;
