//! The record model: one evaluation unit per JSONL line.
//!
//! Input records carry `id`, `problem` and `reply` at minimum; the optional
//! `modified_problem` is the perturbed variant shown to the model under test.
//! Unknown fields are preserved verbatim so the annotated output keeps the
//! full source record. Annotation fields (`label`, `votes`, `final_score`,
//! `note`, `evaluated_at`) stay absent when a stage did not run.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Classification verdict for a model reply. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// The reply asks for more information instead of attempting code.
    #[serde(rename = "clarification-question")]
    ClarifyingQuestion,
    /// The reply attempts the problem directly (contains a code solution).
    #[serde(rename = "direct-attempt")]
    DirectAttempt,
    /// The reply is blank or a meaningless placeholder; no call was made.
    #[serde(rename = "empty-reply")]
    EmptyReply,
    /// The classifier's output matched no known pattern.
    #[serde(rename = "unparseable")]
    Unparseable,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Label::ClarifyingQuestion => "clarification-question",
            Label::DirectAttempt => "direct-attempt",
            Label::EmptyReply => "empty-reply",
            Label::Unparseable => "unparseable",
        };
        f.write_str(s)
    }
}

/// One judge call's answer to a scoring prompt. Immutable once created;
/// retained on the record for auditability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeVote {
    /// Configured judge identity that cast this vote.
    pub judge: String,
    /// Raw response text, or null when the call itself failed.
    pub raw: Option<String>,
    /// Parsed score within the configured bounds, or null for an
    /// unparseable/failed response. Null votes are excluded from reduction.
    pub score: Option<u8>,
}

/// Final aggregated score: a number within the configured bounds, or the
/// `"unavailable"` sentinel when every vote was null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalScore {
    Score(u8),
    Unavailable,
}

impl Serialize for FinalScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FinalScore::Score(n) => serializer.serialize_u8(*n),
            FinalScore::Unavailable => serializer.serialize_str("unavailable"),
        }
    }
}

impl<'de> Deserialize<'de> for FinalScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u8),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(FinalScore::Score(n)),
            Raw::Text(s) if s == "unavailable" => Ok(FinalScore::Unavailable),
            Raw::Text(other) => Err(D::Error::custom(format!(
                "expected a score or \"unavailable\", got \"{}\"",
                other
            ))),
        }
    }
}

/// One evaluation unit. Read from an input file, annotated in place by the
/// classification and rating stages, written to an output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    /// Original problem statement.
    pub problem: String,
    /// Perturbed (ambiguous/incomplete) variant given to the model under
    /// test, when the dataset provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_problem: Option<String>,
    /// Model-under-test's first reply.
    pub reply: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub votes: Vec<JudgeVote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<FinalScore>,
    /// Human-readable provenance of the verdict (how the final score was
    /// reached, or why a stage was skipped).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<String>,

    /// Source fields we do not interpret, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// Problem text used in the scoring prompt's "modified" slot. Datasets
    /// without a perturbed variant score against the original statement.
    pub fn modified_or_problem(&self) -> &str {
        self.modified_problem.as_deref().unwrap_or(&self.problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_use_kebab_case_strings() {
        let json = serde_json::to_string(&Label::ClarifyingQuestion).unwrap();
        assert_eq!(json, "\"clarification-question\"");
        let back: Label = serde_json::from_str("\"direct-attempt\"").unwrap();
        assert_eq!(back, Label::DirectAttempt);
    }

    #[test]
    fn final_score_serializes_number_or_sentinel() {
        assert_eq!(
            serde_json::to_string(&FinalScore::Score(3)).unwrap(),
            "3"
        );
        assert_eq!(
            serde_json::to_string(&FinalScore::Unavailable).unwrap(),
            "\"unavailable\""
        );
        let s: FinalScore = serde_json::from_str("\"unavailable\"").unwrap();
        assert_eq!(s, FinalScore::Unavailable);
        let n: FinalScore = serde_json::from_str("4").unwrap();
        assert_eq!(n, FinalScore::Score(4));
        assert!(serde_json::from_str::<FinalScore>("\"pending\"").is_err());
    }

    #[test]
    fn unknown_input_fields_round_trip() {
        let line = r#"{"id":"HumanEval/0","problem":"p","reply":"r","topn":1,"source":"HumanEvalComm"}"#;
        let record: Record = serde_json::from_str(line).unwrap();
        assert_eq!(record.extra["topn"], 1);
        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["source"], "HumanEvalComm");
        // Annotation fields stay absent until a stage sets them.
        assert!(out.get("label").is_none());
        assert!(out.get("votes").is_none());
    }

    #[test]
    fn modified_problem_falls_back_to_original() {
        let record: Record =
            serde_json::from_str(r#"{"id":"1","problem":"sort a list","reply":"ok"}"#).unwrap();
        assert_eq!(record.modified_or_problem(), "sort a list");
    }
}
