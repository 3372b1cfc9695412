//! Render endpoint.

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use reelgen_models::RenderRequest;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Successful render.
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    /// File name under the output directory
    pub file: String,
    /// Where the file is served
    pub url: String,
    pub duration_secs: f64,
    pub scenes: usize,
}

/// `POST /api/render`: run the pipeline and return the published file.
///
/// The request clock starts here, so time spent waiting for a render slot
/// counts against the pipeline's admission budget.
pub async fn render(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> ApiResult<Json<RenderResponse>> {
    let received_at = Instant::now();
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    metrics::render_waiting(1.0);
    let permit = state.render_slots.clone().acquire_owned().await;
    metrics::render_waiting(-1.0);
    let _permit = permit.map_err(|_| ApiError::internal("render slots closed"))?;
    metrics::record_render_wait(received_at.elapsed().as_secs_f64());

    let output = state.pipeline.run(&request, received_at).await?;

    info!(
        file = %output.file_name,
        duration_secs = output.duration_secs,
        scenes = output.scenes,
        "Render complete"
    );

    Ok(Json(RenderResponse {
        url: state.config.output_url(&output.file_name),
        file: output.file_name,
        duration_secs: output.duration_secs,
        scenes: output.scenes,
    }))
}
