//! Score extraction from free-form judge responses.
//!
//! Judges are asked for bare JSON but routinely wrap it in prose or markdown
//! fences. [`extract`] runs an ordered chain of parse strategies and returns
//! the first JSON object any of them yields. It never fails: a response with
//! no recoverable object yields `None`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// A parsed score object as returned by the judge.
pub type ScoreRecord = Map<String, Value>;

/// A single parse strategy over the trimmed response text.
type Strategy = fn(&str) -> Option<Value>;

/// Strategies in the order they are tried.
const STRATEGIES: [(&str, Strategy); 3] = [
    ("direct", parse_direct),
    ("fenced_block", parse_fenced_block),
    ("brace_span", parse_brace_span),
];

/// Extract a score record from `raw_text`.
///
/// Returns `None` when no strategy yields a non-empty JSON object.
pub fn extract(raw_text: &str) -> Option<ScoreRecord> {
    let text = raw_text.trim();
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let record = strategy(text).and_then(into_record)?;
        tracing::trace!(strategy = name, fields = record.len(), "score record extracted");
        Some(record)
    })
}

fn into_record(value: Value) -> Option<ScoreRecord> {
    match value {
        Value::Object(map) if !map.is_empty() => Some(map),
        _ => None,
    }
}

fn parse_direct(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn fenced_block_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"```(?i:json)?\s*(\{[\s\S]+?\})\s*```").ok())
        .as_ref()
}

fn parse_fenced_block(text: &str) -> Option<Value> {
    let captures = fenced_block_pattern()?.captures(text)?;
    let body = captures.get(1)?.as_str().trim();
    serde_json::from_str(body).ok()
}

fn parse_brace_span(text: &str) -> Option<Value> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last <= first {
        return None;
    }
    serde_json::from_str(text[first..=last].trim()).ok()
}
