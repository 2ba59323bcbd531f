//! `POST /api/chat`: civic assistant question → answer.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Longest accepted question, in characters.
const MAX_QUERY_CHARS: usize = 2000;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn ask(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".into()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Query too long (max {MAX_QUERY_CHARS} chars)"
        )));
    }

    let assistant = ctx.assistant.clone();
    let response = tokio::task::spawn_blocking(move || assistant.respond(&query)).await?;

    Ok(Json(ChatResponse { response }))
}
