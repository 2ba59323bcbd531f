//! Remote inference gateway.
//!
//! Hosted text and vision models sit behind two capability traits so the
//! pipelines never see HTTP. Every failure is typed (`InferenceError`) inside
//! the gateway and degraded to "no result" at the `call_*` boundary.

pub mod types;
pub mod huggingface;
pub mod gateway;
pub mod mock;

pub use types::*;
pub use huggingface::HuggingFaceClient;
pub use gateway::{call_text_model, call_vision_model};
pub use mock::{MockTextClient, MockVisionClient};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("No inference credential configured")]
    MissingCredential,

    #[error("Inference endpoint unreachable: {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Inference endpoint returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
