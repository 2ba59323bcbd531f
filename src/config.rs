use std::net::SocketAddr;

/// Application-level constants
pub const APP_NAME: &str = "PolluFight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hugging Face router endpoint for chat completions (text model contract).
pub const TEXT_COMPLETIONS_URL: &str = "https://router.huggingface.co/v1/chat/completions";

/// Object detection model endpoint (DETR).
pub const OBJECT_DETECTION_URL: &str =
    "https://router.huggingface.co/hf-inference/models/facebook/detr-resnet-50";

/// Scene classification model endpoint (ViT, ImageNet labels).
pub const SCENE_CLASSIFICATION_URL: &str =
    "https://router.huggingface.co/hf-inference/models/google/vit-base-patch16-224";

/// Default instruct model used by the feedback workflow.
pub const DEFAULT_TEXT_MODEL: &str = "meta-llama/Llama-3.2-3B-Instruct";

/// Default model for the civic chat assistant.
pub const DEFAULT_CHAT_MODEL: &str = DEFAULT_TEXT_MODEL;

/// Largest accepted image, uploaded or fetched (10 MB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Value shipped in sample `.env` files. Treated as "no credential".
pub const PLACEHOLDER_TOKEN: &str = "your_token_here";

pub const TEXT_TIMEOUT_SECS: u64 = 45;
pub const VISION_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "pollufight=info,pollufight_lib=info,tower_http=info"
}

/// Runtime configuration resolved once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer token for the inference router. `None` means offline.
    pub api_token: Option<String>,
    pub text_model: String,
    pub chat_model: String,
    pub text_completions_url: String,
    pub object_detection_url: String,
    pub scene_classification_url: String,
    pub bind_addr: SocketAddr,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            text_completions_url: TEXT_COMPLETIONS_URL.to_string(),
            object_detection_url: OBJECT_DETECTION_URL.to_string(),
            scene_classification_url: SCENE_CLASSIFICATION_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8000))),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    ///
    /// `HUGGINGFACE_API_TOKEN` is read first, then `HUGGINGFACEHUB_API_TOKEN`.
    /// An unparsable `POLLUFIGHT_BIND_ADDR` keeps the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        config.api_token = lookup("HUGGINGFACE_API_TOKEN")
            .or_else(|| lookup("HUGGINGFACEHUB_API_TOKEN"))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        if let Some(model) = lookup("POLLUFIGHT_TEXT_MODEL").filter(|m| !m.trim().is_empty()) {
            config.text_model = model.trim().to_string();
        }

        if let Some(model) = lookup("POLLUFIGHT_CHAT_MODEL").filter(|m| !m.trim().is_empty()) {
            config.chat_model = model.trim().to_string();
        }

        if let Some(addr) = lookup("POLLUFIGHT_BIND_ADDR") {
            match addr.parse() {
                Ok(parsed) => config.bind_addr = parsed,
                Err(e) => tracing::warn!(value = %addr, error = %e, "Invalid POLLUFIGHT_BIND_ADDR, using default"),
            }
        }

        config
    }

    /// True when a usable credential is configured.
    pub fn has_credential(&self) -> bool {
        usable_token(self.api_token.as_deref()).is_some()
    }
}

/// Returns the token only if it is present, non-empty, and not the placeholder.
pub fn usable_token(token: Option<&str>) -> Option<&str> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != PLACEHOLDER_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert!(config.api_token.is_none());
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(!config.has_credential());
    }

    #[test]
    fn hub_token_is_fallback() {
        let config = AppConfig::from_lookup(lookup_from(&[("HUGGINGFACEHUB_API_TOKEN", "hf_abc")]));
        assert_eq!(config.api_token.as_deref(), Some("hf_abc"));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("HUGGINGFACE_API_TOKEN", "hf_primary"),
            ("HUGGINGFACEHUB_API_TOKEN", "hf_secondary"),
        ]));
        assert_eq!(config.api_token.as_deref(), Some("hf_primary"));
    }

    #[test]
    fn placeholder_token_is_not_a_credential() {
        let config = AppConfig::from_lookup(lookup_from(&[("HUGGINGFACE_API_TOKEN", "your_token_here")]));
        assert!(config.api_token.is_some());
        assert!(!config.has_credential());
    }

    #[test]
    fn invalid_bind_addr_keeps_default() {
        let config = AppConfig::from_lookup(lookup_from(&[("POLLUFIGHT_BIND_ADDR", "not-an-addr")]));
        assert_eq!(config.bind_addr.port(), 8000);

        let config = AppConfig::from_lookup(lookup_from(&[("POLLUFIGHT_BIND_ADDR", "127.0.0.1:9001")]));
        assert_eq!(config.bind_addr.port(), 9001);
    }

    #[test]
    fn model_override() {
        let config = AppConfig::from_lookup(lookup_from(&[("POLLUFIGHT_TEXT_MODEL", "Qwen/Qwen2.5-7B-Instruct")]));
        assert_eq!(config.text_model, "Qwen/Qwen2.5-7B-Instruct");
        assert_eq!(config.chat_model, DEFAULT_CHAT_MODEL);

        let config = AppConfig::from_lookup(lookup_from(&[("POLLUFIGHT_CHAT_MODEL", " TinyLlama/TinyLlama-1.1B-Chat-v1.0 ")]));
        assert_eq!(config.chat_model, "TinyLlama/TinyLlama-1.1B-Chat-v1.0");
    }

    #[test]
    fn usable_token_filters_blank_and_placeholder() {
        assert_eq!(usable_token(None), None);
        assert_eq!(usable_token(Some("  ")), None);
        assert_eq!(usable_token(Some("your_token_here")), None);
        assert_eq!(usable_token(Some("hf_x")), Some("hf_x"));
    }
}
