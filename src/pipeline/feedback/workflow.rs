use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::stages::*;
use super::types::*;
use crate::pipeline::inference::{call_text_model, GenerationParams, TextModelClient, TextRequest};
use crate::pipeline::json_recovery::extract_json;

/// Four-stage comment analysis, always in this order:
/// sentiment → themes → innovation → compile.
///
/// Each inference stage is independent. A stage that gets no usable model
/// output substitutes its placeholder and the run continues, so `run`
/// always produces a complete `DashboardReport`.
pub struct FeedbackWorkflow {
    client: Arc<dyn TextModelClient>,
    model: String,
    params: GenerationParams,
}

impl FeedbackWorkflow {
    pub fn new(client: Arc<dyn TextModelClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            params: GenerationParams::default(),
        }
    }

    pub fn run(&self, comments: &[String]) -> DashboardReport {
        let _span = tracing::info_span!(
            "feedback_workflow",
            analysis_id = %Uuid::new_v4(),
            comments = comments.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let sentiment = self.sentiment(comments);
        let themes = self.themes(comments);
        let innovations = self.innovation(comments);
        let report = {
            let _stage = tracing::debug_span!("stage", stage = %Stage::Compile).entered();
            compile_report(sentiment, themes, innovations)
        };

        tracing::info!(
            themes = report.theme_map.len(),
            innovations = report.innovation_spotter.len(),
            elapsed_ms = %start.elapsed().as_millis(),
            "Feedback analysis complete"
        );
        report
    }

    pub fn sentiment(&self, comments: &[String]) -> SentimentOutcome {
        let _stage = tracing::debug_span!("stage", stage = %Stage::Sentiment).entered();
        let (data, raw_present) = self.infer(&sentiment_prompt(comments));
        settle(Stage::Sentiment, parse_sentiment(data, raw_present))
    }

    pub fn themes(&self, comments: &[String]) -> Vec<ThemePillar> {
        let _stage = tracing::debug_span!("stage", stage = %Stage::Themes).entered();
        let (data, raw_present) = self.infer(&themes_prompt(comments));
        settle(Stage::Themes, parse_themes(data, raw_present, comments.len()))
    }

    pub fn innovation(&self, comments: &[String]) -> Vec<Innovation> {
        let _stage = tracing::debug_span!("stage", stage = %Stage::Innovation).entered();
        let (data, raw_present) = self.infer(&innovation_prompt(comments));
        settle(Stage::Innovation, parse_innovations(data, raw_present))
    }

    /// Recovered JSON, and whether the model answered at all.
    fn infer(&self, prompt: &str) -> (Option<Value>, bool) {
        let request = TextRequest {
            model: &self.model,
            system: JSON_SYSTEM_INSTRUCTION,
            prompt,
            params: self.params,
        };
        let raw = call_text_model(self.client.as_ref(), &request);
        let data = extract_json(raw.as_deref());
        (data, raw.is_some())
    }
}

fn settle<T>(stage: Stage, output: StageOutput<T>) -> T {
    match output.fallback {
        Some(reason) => tracing::info!(%stage, %reason, "Stage using placeholder"),
        None => tracing::debug!(%stage, "Stage inferred"),
    }
    output.value
}
