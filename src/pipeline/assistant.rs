//! Civic chat assistant: free-text questions about pollution and the app.

use std::sync::Arc;

use crate::pipeline::inference::{call_text_model, GenerationParams, TextModelClient, TextRequest};

pub const CIVIC_SYSTEM_PROMPT: &str = "You are the PolluFight AI Assistant. You help citizens understand pollution, smoke sources, prevention measures, and how the PolluFight app works.

TONE: Informative, Neutral, Civic-focused, Non-marketing.

KEY TOPICS:
- Pollution Types: Smoke, Air, Vehicle, Industrial.
- Prevention: Mitigation steps.
- App Features: AI Lens, Guilty Map, Ward Dashboard, Reporting.
";

pub const APOLOGY_RESPONSE: &str = "I apologize, but I encountered an error creating a response.";

/// Conversational sampling: short answers, some variety.
const CHAT_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 256,
    temperature: 0.7,
};

/// Stateless single-turn assistant over the shared text client.
pub struct CivicAssistant {
    client: Arc<dyn TextModelClient>,
    model: String,
}

impl CivicAssistant {
    pub fn new(client: Arc<dyn TextModelClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Answer one question. Never fails: an unavailable model or an empty
    /// completion yields the fixed apology.
    pub fn respond(&self, query: &str) -> String {
        let request = TextRequest {
            model: &self.model,
            system: CIVIC_SYSTEM_PROMPT,
            prompt: query,
            params: CHAT_PARAMS,
        };

        match call_text_model(self.client.as_ref(), &request) {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => {
                tracing::info!(model = %self.model, "Assistant answered with apology");
                APOLOGY_RESPONSE.to_string()
            }
        }
    }
}
