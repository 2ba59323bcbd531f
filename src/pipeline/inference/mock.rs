//! Scripted inference clients for tests and offline runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::types::{TextModelClient, TextRequest, VisionModelClient, VisionTask};
use super::InferenceError;

/// Replays scripted text responses in call order.
///
/// `None` entries (and calls past the end of the script) fail with
/// `InferenceError::Connection`. Every prompt is recorded.
pub struct MockTextClient {
    responses: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextClient {
    pub fn new(responses: Vec<Option<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails.
    pub fn unavailable() -> Self {
        Self::new(vec![])
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl TextModelClient for MockTextClient {
    fn complete(&self, request: &TextRequest<'_>) -> Result<String, InferenceError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.to_string());
        }
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .flatten();
        next.ok_or_else(|| InferenceError::Connection("mock".into()))
    }
}

/// Fixed vision body per task; a `None` body means failure.
pub struct MockVisionClient {
    detection: Option<Value>,
    classification: Option<Value>,
    calls: AtomicUsize,
}

impl MockVisionClient {
    pub fn new(detection: Value, classification: Value) -> Self {
        Self {
            detection: Some(detection),
            classification: Some(classification),
            calls: AtomicUsize::new(0),
        }
    }

    /// Both endpoints fail.
    pub fn unavailable() -> Self {
        Self {
            detection: None,
            classification: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VisionModelClient for MockVisionClient {
    fn infer(&self, task: VisionTask, _jpeg_bytes: &[u8]) -> Result<Value, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = match task {
            VisionTask::ObjectDetection => &self.detection,
            VisionTask::SceneClassification => &self.classification,
        };
        body.clone().ok_or(InferenceError::Status {
            status: 503,
            body: "mock unavailable".into(),
        })
    }
}
