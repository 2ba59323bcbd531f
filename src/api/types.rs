//! Shared state for the API layer.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::pipeline::assistant::CivicAssistant;
use crate::pipeline::detection::PollutionDetector;
use crate::pipeline::feedback::FeedbackWorkflow;
use crate::pipeline::inference::{TextModelClient, VisionModelClient};

/// Timeout for downloading an image referenced by `image_url`.
const IMAGE_FETCH_TIMEOUT_SECS: u64 = 20;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes. Cheap to clone.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub detector: Arc<PollutionDetector>,
    pub workflow: Arc<FeedbackWorkflow>,
    pub assistant: Arc<CivicAssistant>,
    /// Async client for fetching remote images.
    pub http: reqwest::Client,
}

impl ApiContext {
    pub fn new(
        config: Arc<AppConfig>,
        vision: Arc<dyn VisionModelClient>,
        text: Arc<dyn TextModelClient>,
    ) -> Self {
        let detector = Arc::new(PollutionDetector::new(vision));
        let workflow = Arc::new(FeedbackWorkflow::new(text.clone(), config.text_model.clone()));
        let assistant = Arc::new(CivicAssistant::new(text, config.chat_model.clone()));
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(IMAGE_FETCH_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Image fetch client build failed, using defaults");
                reqwest::Client::new()
            });

        Self {
            config,
            detector,
            workflow,
            assistant,
            http,
        }
    }
}
