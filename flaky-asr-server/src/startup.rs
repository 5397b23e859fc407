//! Server startup and shutdown logic

use std::sync::Arc;

use anyhow::Result;
use axum::{middleware, routing::get, Router};
use flaky_asr_config::{FlakyAsrConfig, ServerConfig};
use flaky_asr_core::{AdmissionController, TranscriptStore};
use flaky_asr_web::{admission_middleware, request_id_middleware};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::handler::{get_asr_output, RequestHandler};

/// Path of the only endpoint
pub const ASR_OUTPUT_ROUTE: &str = "/get-asr-output";

/// Assemble the router: request id outermost, then HTTP tracing, then
/// admission in front of every route
pub fn build_router(handler: RequestHandler, admission: Arc<AdmissionController>, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route(ASR_OUTPUT_ROUTE, get(get_asr_output))
        .with_state(handler)
        .layer(middleware::from_fn_with_state(admission, admission_middleware));

    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    if config.enable_request_id {
        app = app.layer(middleware::from_fn(request_id_middleware));
    }

    app
}

/// Server application struct
pub struct Server {
    config: FlakyAsrConfig,
    handler: RequestHandler,
    admission: Arc<AdmissionController>,
}

impl Server {
    /// Create a server over the built-in transcript dataset
    pub fn new(config: FlakyAsrConfig) -> Result<Self> {
        let store = TranscriptStore::builtin()
            .map_err(|e| anyhow::anyhow!("Failed to load built-in transcripts: {}", e))?;
        Ok(Self::with_store(config, store))
    }

    /// Create a server over an explicit transcript store
    pub fn with_store(config: FlakyAsrConfig, store: TranscriptStore) -> Self {
        let handler = RequestHandler::from_config(&config.simulation, Arc::new(store));
        let admission = Arc::new(AdmissionController::new(config.simulation.max_concurrent_requests));

        Self {
            config,
            handler,
            admission,
        }
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        build_router(self.handler.clone(), self.admission.clone(), &self.config.server)
    }

    /// Shared admission controller, for inspection
    pub fn admission(&self) -> Arc<AdmissionController> {
        self.admission.clone()
    }

    /// Bind the configured address and serve until a shutdown signal
    pub async fn start(self) -> Result<()> {
        let addr = self.config.server.listen_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until a shutdown signal
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = self.build_app();
        let addr = listener.local_addr()?;

        tracing::info!("Starting flaky ASR server on {}", addr);
        self.log_config_summary();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        let stats = self.admission.stats();
        tracing::info!(
            admitted = stats.admitted_total,
            rejected = stats.rejected_total,
            "Server shutdown complete"
        );
        Ok(())
    }

    /// Log configuration summary
    fn log_config_summary(&self) {
        let simulation = &self.config.simulation;
        tracing::info!("=== Flaky ASR Configuration ===");
        tracing::info!("Listen Address: {}", self.config.server.listen_address());
        tracing::info!(
            "Delay: {:?} + up to {:?} jitter",
            simulation.base_delay,
            simulation.delay_jitter
        );
        tracing::info!("Failure Probability: {}", simulation.failure_probability);
        tracing::info!("Max Concurrent Requests: {}", simulation.max_concurrent_requests);
        if let Some(seed) = simulation.seed {
            tracing::info!("Random Seed: {}", seed);
        }
        tracing::info!("Supported paths: {:?}", self.handler.store().ids());
        tracing::info!("===============================");
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
