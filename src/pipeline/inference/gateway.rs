//! Degrading call boundary.
//!
//! Pipelines call these instead of the traits directly: a failed text call
//! becomes `None`, a failed vision call becomes `[]`. The typed reason is
//! logged here and goes no further.

use serde_json::Value;

use super::types::{TextModelClient, TextRequest, VisionModelClient, VisionTask};
use super::InferenceError;

/// Run a text completion, `None` when inference is unavailable.
pub fn call_text_model(client: &dyn TextModelClient, request: &TextRequest<'_>) -> Option<String> {
    match client.complete(request) {
        Ok(text) => Some(text),
        Err(InferenceError::MissingCredential) => {
            tracing::debug!(model = request.model, "No credential, text inference skipped");
            None
        }
        Err(e) => {
            tracing::warn!(model = request.model, error = %e, "Text inference failed");
            None
        }
    }
}

/// Run a vision model, `[]` when inference is unavailable.
pub fn call_vision_model(client: &dyn VisionModelClient, task: VisionTask, jpeg_bytes: &[u8]) -> Value {
    match client.infer(task, jpeg_bytes) {
        Ok(value) => value,
        Err(InferenceError::MissingCredential) => {
            tracing::debug!(%task, "No credential, vision inference skipped");
            Value::Array(vec![])
        }
        Err(e) => {
            tracing::warn!(%task, error = %e, "Vision inference failed");
            Value::Array(vec![])
        }
    }
}
