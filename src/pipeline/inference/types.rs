use serde_json::Value;

use super::InferenceError;

/// Sampling settings for a single text completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    /// Low temperature for near-deterministic JSON output.
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.1,
        }
    }
}

/// One text-model call: model id, system instruction, user prompt, sampling.
#[derive(Debug, Clone)]
pub struct TextRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub params: GenerationParams,
}

/// Which hosted vision model to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionTask {
    /// DETR: `[{label, score, box}]`
    ObjectDetection,
    /// ViT over ImageNet classes: `[{label, score}]`
    SceneClassification,
}

impl std::fmt::Display for VisionTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ObjectDetection => write!(f, "object detection"),
            Self::SceneClassification => write!(f, "scene classification"),
        }
    }
}

/// Chat-completion model client abstraction (allows mocking)
pub trait TextModelClient: Send + Sync {
    fn complete(&self, request: &TextRequest<'_>) -> Result<String, InferenceError>;
}

/// Image model client abstraction. Input is JPEG bytes.
pub trait VisionModelClient: Send + Sync {
    fn infer(&self, task: VisionTask, jpeg_bytes: &[u8]) -> Result<Value, InferenceError>;
}
