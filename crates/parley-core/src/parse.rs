//! Free-text response parsing, isolated from the network calls so its
//! failure modes can be tested on their own. Every function here is total:
//! a response that matches no known pattern yields `None`, never an error.

use crate::record::Label;

/// Pull the first JSON value out of a reply that may wrap it in prose or
/// markdown fences.
pub(crate) fn extract_first_json(text: &str) -> Option<serde_json::Value> {
    let start = text.find(['{', '['])?;
    serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<serde_json::Value>()
        .next()?
        .ok()
}

/// Parse a classifier reply into a label. Accepts the requested
/// `{"classification": ...}` shape or a bare keyword anywhere in the text.
pub fn parse_label(text: &str) -> Option<Label> {
    let trimmed = text.trim();
    if let Some(val) = extract_first_json(trimmed) {
        if let Some(s) = val.get("classification").and_then(|v| v.as_str()) {
            return keyword_label(s);
        }
    }
    keyword_label(trimmed)
}

fn keyword_label(text: &str) -> Option<Label> {
    let lower = text.to_lowercase();
    if lower.contains("clarifying question") || lower.contains("clarification question") {
        Some(Label::ClarifyingQuestion)
    } else if lower.contains("code solution") || lower.contains("direct attempt") {
        Some(Label::DirectAttempt)
    } else {
        None
    }
}

/// Parse a juror reply into a score within `min..=max`. Accepts the
/// requested `{"score": n, ...}` shape; anything else, including an
/// out-of-range integer, is a null vote.
pub fn parse_score(text: &str, min: u8, max: u8) -> Option<u8> {
    let val = extract_first_json(text.trim())?;
    let n = val.get("score")?.as_u64()?;
    let n = u8::try_from(n).ok()?;
    (min..=max).contains(&n).then_some(n)
}
