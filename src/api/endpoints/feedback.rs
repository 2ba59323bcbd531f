//! `POST /api/feedback/analyze`: community comments → dashboard.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::feedback::DashboardReport;

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub comments: Vec<String>,
}

/// Runs the four-stage workflow off the async runtime.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<DashboardReport>, ApiError> {
    if payload.comments.is_empty() {
        return Err(ApiError::BadRequest("No comments provided".into()));
    }

    let workflow = ctx.workflow.clone();
    let report = tokio::task::spawn_blocking(move || workflow.run(&payload.comments)).await?;

    Ok(Json(report))
}
