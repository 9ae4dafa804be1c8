//! Classification stage: decide whether a model reply contains a clarifying
//! question or a direct code attempt.
//!
//! Classification runs independently of scoring: an unparseable classifier
//! reply labels the record `unparseable` instead of guessing, so a malformed
//! score can never silently imply a wrong communication verdict.

use crate::config::RunConfig;
use crate::errors::{ConfigError, StageError};
use crate::parse;
use crate::prompt;
use crate::providers::llm::{build_client, LlmClient, SamplingParams};
use crate::record::Label;
use std::sync::Arc;

pub struct Classifier {
    client: Arc<dyn LlmClient>,
    params: SamplingParams,
}

impl Classifier {
    pub fn new(client: Arc<dyn LlmClient>, params: SamplingParams) -> Self {
        Self { client, params }
    }

    pub fn from_config(cfg: &RunConfig) -> Result<Self, ConfigError> {
        let client = build_client(cfg, "classifier", &cfg.classifier.model)?;
        Ok(Self::new(
            client,
            SamplingParams {
                temperature: cfg.classifier.temperature,
                max_tokens: cfg.classifier.max_tokens,
            },
        ))
    }

    /// Classify one reply. Blank or placeholder replies short-circuit to
    /// `EmptyReply` without a network call. A completion failure propagates
    /// so the driver can abort this record's annotation; a reply that
    /// matches no known pattern does not.
    pub async fn classify(&self, reply: &str) -> Result<Label, StageError> {
        if is_empty_reply(reply) {
            return Ok(Label::EmptyReply);
        }
        let rendered = prompt::CLASSIFIER.render(&[("reply", reply)])?;
        let resp = self.client.complete(&rendered, &self.params).await?;
        Ok(parse::parse_label(&resp.text).unwrap_or_else(|| {
            tracing::warn!(
                provider = self.client.provider_name(),
                raw = %resp.text,
                "classifier reply matched no known label"
            );
            Label::Unparseable
        }))
    }
}

const MEANINGLESS: &[&str] = &[
    "n/a", "na", "none", "null", "empty", "no response", "no content", "-", "--", "---",
];

/// A reply that carries no content worth classifying: blank, a placeholder
/// token, or punctuation only.
pub fn is_empty_reply(reply: &str) -> bool {
    let cleaned = reply.trim();
    if cleaned.is_empty() {
        return true;
    }
    if MEANINGLESS.contains(&cleaned.to_lowercase().as_str()) {
        return true;
    }
    cleaned
        .chars()
        .all(|c| c.is_whitespace() || ".,;:!?-_()[]{}\"'".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompletionError;
    use crate::providers::llm::testing::ScriptedClient;

    fn classifier(client: Arc<ScriptedClient>) -> Classifier {
        Classifier::new(
            client,
            SamplingParams {
                temperature: 0.0,
                max_tokens: 50,
            },
        )
    }

    #[tokio::test]
    async fn labels_a_clarifying_question() {
        let client = ScriptedClient::replying(
            "openai",
            &[r#"{"classification": "Clarifying Question"}"#],
        );
        let label = classifier(client)
            .classify("Can you clarify whether the list may contain duplicates?")
            .await
            .unwrap();
        assert_eq!(label, Label::ClarifyingQuestion);
    }

    #[tokio::test]
    async fn empty_reply_makes_no_network_call() {
        let client = ScriptedClient::replying("openai", &[]);
        let c = classifier(client.clone());
        assert_eq!(c.classify("   ").await.unwrap(), Label::EmptyReply);
        assert_eq!(c.classify("n/a").await.unwrap(), Label::EmptyReply);
        assert_eq!(c.classify("...!?").await.unwrap(), Label::EmptyReply);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_reply_is_unparseable_not_a_guess() {
        // The reply contains a code fence; the old behavior would have
        // guessed "code solution" from it. We refuse to guess.
        let client = ScriptedClient::replying("openai", &["no idea ```python```"]);
        let label = classifier(client)
            .classify("some reply with ``` in it")
            .await
            .unwrap();
        assert_eq!(label, Label::Unparseable);
    }

    #[tokio::test]
    async fn completion_failure_propagates() {
        let client = ScriptedClient::new(
            "openai",
            vec![Err(CompletionError::Fatal {
                provider: "openai".into(),
                status: Some(401),
                message: "bad key".into(),
            })],
        );
        let err = classifier(client).classify("a real reply").await.unwrap_err();
        assert!(matches!(err, StageError::Completion(_)));
    }

    #[test]
    fn empty_reply_detection() {
        assert!(is_empty_reply(""));
        assert!(is_empty_reply("  \t\n"));
        assert!(is_empty_reply("NONE"));
        assert!(is_empty_reply("---"));
        assert!(!is_empty_reply("Can you clarify?"));
        assert!(!is_empty_reply("x"));
    }
}
