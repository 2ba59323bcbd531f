//! Prompt building, response mapping and placeholders for each inference
//! stage of the feedback workflow.
//!
//! Small instruct models drift on field names (`topic` for `theme`, `count`
//! for `mentions`), so every field is read through an ordered list of
//! accepted keys ending in a literal default.

use serde_json::{Map, Value};

use super::types::*;

pub const MAX_PROMPT_COMMENTS: usize = 30;
pub const MAX_THEMES: usize = 5;
pub const MAX_INNOVATIONS: usize = 3;

/// Instruction sent with every stage prompt.
pub const JSON_SYSTEM_INSTRUCTION: &str =
    "You are a helpful urban planning assistant. Return only structured JSON.";

/// An object carrying none of these is not a sentiment answer
/// (e.g. a provider `{"error": ...}` envelope).
const SENTIMENT_KEYS: [&str; 5] = ["support", "neutral", "oppose", "insight", "reasoning"];

// ═══════════════════════════════════════════
// Shared helpers
// ═══════════════════════════════════════════

/// First 30 comments, one per line. Truncation, not sampling.
pub fn comments_block(comments: &[String]) -> String {
    comments
        .iter()
        .take(MAX_PROMPT_COMMENTS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// First key holding a string (or a scalar rendered as one).
fn text_field(obj: &Map<String, Value>, keys: &[&str], default: &str) -> String {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| default.to_string())
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// First key holding a number or numeric string.
fn number_field(obj: &Map<String, Value>, keys: &[&str], default: f64) -> f64 {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(as_number)
        .unwrap_or(default)
}

/// First key holding a non-negative count.
fn count_field(obj: &Map<String, Value>, keys: &[&str], default: u32) -> u32 {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(as_number)
        .find(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n.round() as u32)
        .unwrap_or(default)
}

fn classify_missing(raw_present: bool) -> FallbackReason {
    if raw_present {
        FallbackReason::Unrecoverable
    } else {
        FallbackReason::Unavailable
    }
}

// ═══════════════════════════════════════════
// Sentiment
// ═══════════════════════════════════════════

pub fn sentiment_prompt(comments: &[String]) -> String {
    format!(
        "Analyze the sentiment of these community comments.\n\
Comments:\n{comments}\n\n\
Return ONLY JSON, no prose:\n\
{{\"support\": 0-100, \"neutral\": 0-100, \"oppose\": 0-100, \
\"insight\": \"string\", \"reasoning\": \"string\"}}",
        comments = comments_block(comments),
    )
}

pub fn sentiment_placeholder() -> SentimentOutcome {
    SentimentOutcome {
        vibe_check: SentimentDistribution {
            support: 72.0,
            neutral: 18.0,
            oppose: 10.0,
        },
        deep_sentiment: DeepSentiment {
            insight: "Demo Insight".to_string(),
            reasoning: "API fallback.".to_string(),
        },
    }
}

/// Map the recovered JSON of the sentiment stage.
///
/// `raw_present` tells an unavailable model apart from unparsable output.
pub fn parse_sentiment(data: Option<Value>, raw_present: bool) -> StageOutput<SentimentOutcome> {
    let obj = match data {
        None => return StageOutput::placeholder(sentiment_placeholder(), classify_missing(raw_present)),
        Some(Value::Object(obj)) if SENTIMENT_KEYS.iter().any(|k| obj.contains_key(*k)) => obj,
        Some(_) => return StageOutput::placeholder(sentiment_placeholder(), FallbackReason::WrongShape),
    };

    StageOutput::inferred(SentimentOutcome {
        vibe_check: SentimentDistribution {
            support: number_field(&obj, &["support"], 72.0),
            neutral: number_field(&obj, &["neutral"], 18.0),
            oppose: number_field(&obj, &["oppose"], 10.0),
        },
        deep_sentiment: DeepSentiment {
            insight: text_field(&obj, &["insight"], "Significant concern detected."),
            reasoning: text_field(&obj, &["reasoning"], "Extracted from comment patterns."),
        },
    })
}

// ═══════════════════════════════════════════
// Themes
// ═══════════════════════════════════════════

pub fn themes_prompt(comments: &[String]) -> String {
    format!(
        "Group these community comments into 3-4 themes.\n\
Comments:\n{comments}\n\n\
Return ONLY a JSON list, no prose:\n\
[{{\"theme\": \"name\", \"mentions\": count, \"summary\": \"text\"}}]",
        comments = comments_block(comments),
    )
}

pub fn themes_placeholder(comment_count: usize) -> Vec<ThemePillar> {
    vec![ThemePillar {
        theme: "General".to_string(),
        mentions: u32::try_from(comment_count).unwrap_or(u32::MAX),
        summary: "Analysis in progress.".to_string(),
    }]
}

pub fn parse_themes(
    data: Option<Value>,
    raw_present: bool,
    comment_count: usize,
) -> StageOutput<Vec<ThemePillar>> {
    let fallback = |reason| StageOutput::placeholder(themes_placeholder(comment_count), reason);

    let items = match data {
        None => return fallback(classify_missing(raw_present)),
        Some(Value::Array(items)) if !items.is_empty() => items,
        Some(_) => return fallback(FallbackReason::WrongShape),
    };

    let pillars: Vec<ThemePillar> = items
        .iter()
        .take(MAX_THEMES)
        .filter_map(Value::as_object)
        .map(|item| ThemePillar {
            theme: text_field(item, &["theme", "topic"], "General"),
            mentions: count_field(item, &["mentions", "count"], 1),
            summary: text_field(item, &["summary", "description"], "Insight extracted from comments."),
        })
        .collect();

    if pillars.is_empty() {
        return fallback(FallbackReason::NoUsableEntries);
    }
    StageOutput::inferred(pillars)
}

// ═══════════════════════════════════════════
// Innovation
// ═══════════════════════════════════════════

pub fn innovation_prompt(comments: &[String]) -> String {
    format!(
        "Identify 2 unique, constructive suggestions in these community comments.\n\
Comments:\n{comments}\n\n\
Return ONLY a JSON list, no prose:\n\
[{{\"idea\": \"name\", \"context\": \"text\"}}]",
        comments = comments_block(comments),
    )
}

pub fn innovation_placeholder() -> Vec<Innovation> {
    vec![Innovation {
        idea: "Innovation Check".to_string(),
        context: "No unique ideas found yet.".to_string(),
    }]
}

pub fn parse_innovations(data: Option<Value>, raw_present: bool) -> StageOutput<Vec<Innovation>> {
    let fallback = |reason| StageOutput::placeholder(innovation_placeholder(), reason);

    let items = match data {
        None => return fallback(classify_missing(raw_present)),
        Some(Value::Array(items)) if !items.is_empty() => items,
        Some(_) => return fallback(FallbackReason::WrongShape),
    };

    let innovations: Vec<Innovation> = items
        .iter()
        .take(MAX_INNOVATIONS)
        .filter_map(Value::as_object)
        .map(|item| Innovation {
            idea: text_field(item, &["idea", "suggestion"], "New Concept"),
            context: text_field(
                item,
                &["context", "description", "reasoning"],
                "Derived from community feedback.",
            ),
        })
        .collect();

    if innovations.is_empty() {
        return fallback(FallbackReason::NoUsableEntries);
    }
    StageOutput::inferred(innovations)
}

// ═══════════════════════════════════════════
// Compile
// ═══════════════════════════════════════════

/// Terminal stage: no inference, just assembly.
pub fn compile_report(
    sentiment: SentimentOutcome,
    theme_map: Vec<ThemePillar>,
    innovation_spotter: Vec<Innovation>,
) -> DashboardReport {
    DashboardReport {
        vibe_check: sentiment.vibe_check,
        deep_sentiment: sentiment.deep_sentiment,
        theme_map,
        innovation_spotter,
    }
}
