use serde::{Deserialize, Serialize};

/// Share of support / neutral / oppose, in percent as reported by the model.
/// The three values are not forced to sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub support: f64,
    pub neutral: f64,
    pub oppose: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepSentiment {
    /// Emotional undercurrent: urgency, a specific group's concern.
    pub insight: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePillar {
    pub theme: String,
    pub mentions: u32,
    pub summary: String,
}

/// A constructive, unusual suggestion raised by residents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Innovation {
    pub idea: String,
    pub context: String,
}

/// Output of the sentiment stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentOutcome {
    pub vibe_check: SentimentDistribution,
    pub deep_sentiment: DeepSentiment,
}

/// Final dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub vibe_check: SentimentDistribution,
    pub deep_sentiment: DeepSentiment,
    pub theme_map: Vec<ThemePillar>,
    pub innovation_spotter: Vec<Innovation>,
}

/// Why a stage used its placeholder instead of model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No response: no credential, transport failure, non-200.
    Unavailable,
    /// Response text held no recoverable JSON.
    Unrecoverable,
    /// JSON recovered but not the expected object/list.
    WrongShape,
    /// List recovered but no entry was usable.
    NoUsableEntries,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "inference unavailable"),
            Self::Unrecoverable => write!(f, "no JSON in response"),
            Self::WrongShape => write!(f, "unexpected JSON shape"),
            Self::NoUsableEntries => write!(f, "no usable entries"),
        }
    }
}

/// A stage result plus, when a placeholder was substituted, the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput<T> {
    pub value: T,
    pub fallback: Option<FallbackReason>,
}

impl<T> StageOutput<T> {
    pub fn inferred(value: T) -> Self {
        Self { value, fallback: None }
    }

    pub fn placeholder(value: T, reason: FallbackReason) -> Self {
        Self {
            value,
            fallback: Some(reason),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Workflow nodes, in execution order. Used to tag logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sentiment,
    Themes,
    Innovation,
    Compile,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Themes => "themes",
            Self::Innovation => "innovation",
            Self::Compile => "compile",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
