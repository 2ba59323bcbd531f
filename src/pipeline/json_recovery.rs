//! Best-effort JSON recovery from free-form model output.
//!
//! Instruct models asked for "JSON only" still wrap the payload in prose,
//! code fences, or trailing commentary. `extract_json` tries three
//! progressively blunter strategies and returns the first value that parses.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// First `{...}` or `[...]` span, greedy, dot matches newline.
static JSON_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(\{.*\}|\[.*\])").expect("JSON span pattern is valid")
});

#[derive(Error, Debug, PartialEq)]
pub enum RecoveryError {
    #[error("No inference output to recover from")]
    NoInput,

    #[error("No '{open}'...'{close}' span in output")]
    NoSpan { open: char, close: char },

    #[error("Span failed to parse: {0}")]
    Parse(String),
}

/// Recover a JSON value from model output.
///
/// `None` input (inference unavailable) returns `None` without work.
/// Never panics.
pub fn extract_json(text: Option<&str>) -> Option<Value> {
    match try_extract_json(text) {
        Ok(value) => Some(value),
        Err(e) => {
            if e != RecoveryError::NoInput {
                let preview: String = text.unwrap_or_default().chars().take(100).collect();
                tracing::debug!(error = %e, preview = %preview, "JSON recovery failed");
            }
            None
        }
    }
}

/// Same as [`extract_json`] but keeps the reason of the last failed stage.
pub fn try_extract_json(text: Option<&str>) -> Result<Value, RecoveryError> {
    let text = text.ok_or(RecoveryError::NoInput)?;

    from_regex_span(text)
        .or_else(|_| from_delimiters(text, '{', '}'))
        .or_else(|_| from_delimiters(text, '[', ']'))
}

fn from_regex_span(text: &str) -> Result<Value, RecoveryError> {
    let span = JSON_SPAN
        .find(text)
        .ok_or(RecoveryError::NoSpan { open: '{', close: '}' })?;
    parse(span.as_str())
}

fn from_delimiters(text: &str, open: char, close: char) -> Result<Value, RecoveryError> {
    match (text.find(open), text.rfind(close)) {
        (Some(start), Some(end)) if start < end => parse(&text[start..=end]),
        _ => Err(RecoveryError::NoSpan { open, close }),
    }
}

fn parse(candidate: &str) -> Result<Value, RecoveryError> {
    serde_json::from_str(candidate).map_err(|e| RecoveryError::Parse(e.to_string()))
}
