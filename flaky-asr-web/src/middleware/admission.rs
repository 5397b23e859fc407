use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use flaky_asr_core::AdmissionController;
use std::sync::Arc;
use tracing::warn;

use crate::errors::WebError;

/// Admission control middleware
///
/// Rejects with 429 before the request reaches any handler when the
/// controller is saturated. Otherwise the permit is held until the downstream
/// future finishes or is dropped (client disconnect), and released then.
pub async fn admission_middleware(
    State(controller): State<Arc<AdmissionController>>,
    request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let _permit = controller.admit().map_err(|err| {
        warn!(
            method = %request.method(),
            uri = %request.uri(),
            "{}",
            err
        );
        WebError::from(err)
    })?;

    Ok(next.run(request).await)
}
