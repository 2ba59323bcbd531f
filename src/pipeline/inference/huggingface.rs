use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::types::{TextModelClient, TextRequest, VisionModelClient, VisionTask};
use super::InferenceError;
use crate::config::{self, AppConfig};

/// Hugging Face inference router client.
///
/// One instance serves both the chat-completion endpoint and the two vision
/// endpoints. Built once at startup and shared behind `Arc`.
pub struct HuggingFaceClient {
    token: Option<String>,
    text_url: String,
    object_detection_url: String,
    scene_classification_url: String,
    text_client: reqwest::blocking::Client,
    vision_client: reqwest::blocking::Client,
}

impl HuggingFaceClient {
    /// Build a client from resolved configuration.
    ///
    /// Must be called outside an async context (blocking reqwest client).
    pub fn new(config: &AppConfig) -> Result<Self, InferenceError> {
        Ok(Self {
            token: config.api_token.clone(),
            text_url: config.text_completions_url.clone(),
            object_detection_url: config.object_detection_url.clone(),
            scene_classification_url: config.scene_classification_url.clone(),
            text_client: build_http_client(config::TEXT_TIMEOUT_SECS)?,
            vision_client: build_http_client(config::VISION_TIMEOUT_SECS)?,
        })
    }

    /// Bearer token, or `MissingCredential` before any network activity.
    fn bearer(&self) -> Result<&str, InferenceError> {
        config::usable_token(self.token.as_deref()).ok_or(InferenceError::MissingCredential)
    }

    fn vision_url(&self, task: VisionTask) -> &str {
        match task {
            VisionTask::ObjectDetection => &self.object_detection_url,
            VisionTask::SceneClassification => &self.scene_classification_url,
        }
    }
}

fn build_http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, InferenceError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| InferenceError::HttpClient(e.to_string()))
}

fn map_transport_error(e: reqwest::Error, url: &str, timeout_secs: u64) -> InferenceError {
    if e.is_timeout() {
        InferenceError::Timeout(timeout_secs)
    } else if e.is_connect() {
        InferenceError::Connection(url.to_string())
    } else {
        InferenceError::HttpClient(e.to_string())
    }
}

/// Request body for the chat-completions endpoint
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_request(request: &TextRequest<'a>) -> Self {
        Self {
            model: request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            max_tokens: request.params.max_tokens,
            temperature: request.params.temperature,
            stream: false,
        }
    }
}

/// Pull `choices[0].message.content`; any other JSON shape is returned raw.
fn completion_text(body: &str) -> Result<String, InferenceError> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|e| InferenceError::ResponseParsing(e.to_string()))?;

    match parsed.pointer("/choices/0/message/content") {
        Some(Value::String(content)) => Ok(content.clone()),
        _ => Ok(parsed.to_string()),
    }
}

impl TextModelClient for HuggingFaceClient {
    fn complete(&self, request: &TextRequest<'_>) -> Result<String, InferenceError> {
        let token = self.bearer()?;
        let body = ChatCompletionRequest::from_request(request);

        let response = self
            .text_client
            .post(&self.text_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .map_err(|e| map_transport_error(e, &self.text_url, config::TEXT_TIMEOUT_SECS))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .map_err(|e| InferenceError::ResponseParsing(e.to_string()))?;
        completion_text(&text)
    }
}

impl VisionModelClient for HuggingFaceClient {
    fn infer(&self, task: VisionTask, jpeg_bytes: &[u8]) -> Result<Value, InferenceError> {
        let token = self.bearer()?;
        let url = self.vision_url(task);

        let response = self
            .vision_client
            .post(url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(jpeg_bytes.to_vec())
            .send()
            .map_err(|e| map_transport_error(e, url, config::VISION_TIMEOUT_SECS))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| InferenceError::ResponseParsing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::feedback::stages::{parse_sentiment, sentiment_placeholder};
    use crate::pipeline::inference::{call_text_model, call_vision_model, GenerationParams};
    use crate::pipeline::json_recovery::extract_json;
    use serde_json::json;

    fn offline_config() -> AppConfig {
        AppConfig {
            // Unroutable: any accidental request would fail, not hang on DNS.
            text_completions_url: "http://127.0.0.1:9/v1/chat/completions".into(),
            object_detection_url: "http://127.0.0.1:9/detr".into(),
            scene_classification_url: "http://127.0.0.1:9/vit".into(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn completion_text_extracts_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"a\":1}"}}]}"#;
        assert_eq!(completion_text(body).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn completion_text_returns_raw_body_on_unexpected_shape() {
        let body = r#"{"error":"model loading","estimated_time":20}"#;
        let text = completion_text(body).unwrap();
        assert!(text.contains("model loading"));
    }

    #[test]
    fn error_envelope_does_not_pass_as_sentiment() {
        let body = r#"{"error":"Model is currently loading","estimated_time":20.0}"#;
        let text = completion_text(body).unwrap();
        let out = parse_sentiment(extract_json(Some(&text)), true);
        assert!(out.is_placeholder());
        assert_eq!(out.value, sentiment_placeholder());
    }

    #[test]
    fn completion_text_with_empty_choices_returns_raw() {
        let text = completion_text(r#"{"choices":[]}"#).unwrap();
        assert_eq!(text, r#"{"choices":[]}"#);
    }

    #[test]
    fn completion_text_rejects_non_json() {
        assert!(matches!(
            completion_text("<html>502</html>"),
            Err(InferenceError::ResponseParsing(_))
        ));
    }

    #[test]
    fn request_body_shape() {
        let request = TextRequest {
            model: "meta-llama/Llama-3.2-3B-Instruct",
            system: "Return only JSON.",
            prompt: "Group comments",
            params: GenerationParams::default(),
        };
        let body = serde_json::to_value(ChatCompletionRequest::from_request(&request)).unwrap();
        assert_eq!(body["model"], "meta-llama/Llama-3.2-3B-Instruct");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Return only JSON.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Group comments");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn missing_token_short_circuits_text() {
        let client = HuggingFaceClient::new(&offline_config()).unwrap();
        let request = TextRequest {
            model: "m",
            system: "s",
            prompt: "p",
            params: GenerationParams::default(),
        };
        assert!(matches!(
            client.complete(&request),
            Err(InferenceError::MissingCredential)
        ));
    }

    #[test]
    fn placeholder_token_short_circuits_vision() {
        let config = AppConfig {
            api_token: Some(crate::config::PLACEHOLDER_TOKEN.into()),
            ..offline_config()
        };
        let client = HuggingFaceClient::new(&config).unwrap();
        assert!(matches!(
            client.infer(VisionTask::ObjectDetection, &[0xFF, 0xD8]),
            Err(InferenceError::MissingCredential)
        ));
    }

    #[test]
    fn vision_url_per_task() {
        let client = HuggingFaceClient::new(&offline_config()).unwrap();
        assert!(client.vision_url(VisionTask::ObjectDetection).ends_with("/detr"));
        assert!(client.vision_url(VisionTask::SceneClassification).ends_with("/vit"));
    }

    fn credentialed_offline_client() -> HuggingFaceClient {
        let config = AppConfig {
            api_token: Some("hf_test".into()),
            ..offline_config()
        };
        HuggingFaceClient::new(&config).unwrap()
    }

    fn text_request() -> TextRequest<'static> {
        TextRequest {
            model: "m",
            system: "s",
            prompt: "p",
            params: GenerationParams::default(),
        }
    }

    #[test]
    fn unreachable_text_endpoint_is_transport_error() {
        let client = credentialed_offline_client();
        let result = client.complete(&text_request());
        assert!(
            matches!(result, Err(InferenceError::Connection(_) | InferenceError::HttpClient(_))),
            "got {result:?}"
        );
    }

    #[test]
    fn unreachable_vision_endpoint_is_transport_error() {
        let client = credentialed_offline_client();
        let result = client.infer(VisionTask::SceneClassification, &[0xFF, 0xD8]);
        assert!(
            matches!(result, Err(InferenceError::Connection(_) | InferenceError::HttpClient(_))),
            "got {result:?}"
        );
    }

    #[test]
    fn unreachable_endpoints_degrade_through_gateway() {
        let client = credentialed_offline_client();
        assert_eq!(call_text_model(&client, &text_request()), None);
        assert_eq!(
            call_vision_model(&client, VisionTask::ObjectDetection, &[0xFF, 0xD8]),
            json!([])
        );
    }
}
