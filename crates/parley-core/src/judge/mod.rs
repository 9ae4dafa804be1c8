//! Rating stage: a jury of configured judge identities scores the quality
//! of a clarifying question.
//!
//! Each judge casts an independent vote (optionally self-consistent over
//! several samples); every raw response and parsed score is retained on the
//! record so the verdict can be audited and recomputed. Calls run strictly
//! sequentially.

pub mod reduce;

use crate::config::RunConfig;
use crate::errors::{ConfigError, TemplateError};
use crate::parse;
use crate::prompt;
use crate::providers::llm::{build_client, LlmClient, SamplingParams};
use crate::record::{FinalScore, JudgeVote};
use std::sync::Arc;
use std::time::Duration;

pub struct Juror {
    name: String,
    client: Arc<dyn LlmClient>,
}

impl Juror {
    pub fn new(name: impl Into<String>, client: Arc<dyn LlmClient>) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JuryOptions {
    pub params: SamplingParams,
    pub samples_per_judge: u32,
    pub score_min: u8,
    pub score_max: u8,
    /// Pause between consecutive judge calls. Zero disables.
    pub poll_delay: Duration,
}

impl Default for JuryOptions {
    fn default() -> Self {
        Self {
            params: SamplingParams {
                temperature: 1.0,
                max_tokens: 1000,
            },
            samples_per_judge: 1,
            score_min: 1,
            score_max: 5,
            poll_delay: Duration::ZERO,
        }
    }
}

/// Outcome of rating one record: the reduced final score, every individual
/// vote, and a note on how the score was reached.
#[derive(Debug, Clone)]
pub struct JuryVerdict {
    pub final_score: FinalScore,
    pub votes: Vec<JudgeVote>,
    pub note: String,
}

pub struct Jury {
    jurors: Vec<Juror>,
    opts: JuryOptions,
}

impl Jury {
    pub fn new(jurors: Vec<Juror>, opts: JuryOptions) -> Self {
        Self { jurors, opts }
    }

    pub fn from_config(cfg: &RunConfig) -> Result<Self, ConfigError> {
        let mut jurors = Vec::with_capacity(cfg.jury.len());
        for juror in &cfg.jury {
            let client = build_client(cfg, &juror.name, &juror.model)?;
            jurors.push(Juror::new(juror.name.clone(), client));
        }
        Ok(Self::new(
            jurors,
            JuryOptions {
                params: SamplingParams {
                    temperature: cfg.judge_temperature,
                    max_tokens: cfg.judge_max_tokens,
                },
                samples_per_judge: cfg.samples_per_judge,
                score_min: cfg.score_min,
                score_max: cfg.score_max,
                poll_delay: Duration::from_millis(cfg.poll_delay_ms),
            },
        ))
    }

    /// Score one clarifying question. A failed or unparseable judge call
    /// becomes a null vote, excluded from the reduction; the verdict is
    /// `Unavailable` only when every vote is null.
    pub async fn score(
        &self,
        problem: &str,
        modified_problem: &str,
        question: &str,
    ) -> Result<JuryVerdict, TemplateError> {
        let score_min = self.opts.score_min.to_string();
        let score_max = self.opts.score_max.to_string();
        let rendered = prompt::JUROR.render(&[
            ("score_min", score_min.as_str()),
            ("score_max", score_max.as_str()),
            ("problem", problem),
            ("modified_problem", modified_problem),
            ("question", question),
        ])?;

        let mut votes = Vec::new();
        for juror in &self.jurors {
            for sample in 0..self.opts.samples_per_judge {
                if !votes.is_empty() && !self.opts.poll_delay.is_zero() {
                    tokio::time::sleep(self.opts.poll_delay).await;
                }
                let vote = match juror.client.complete(&rendered, &self.opts.params).await {
                    Ok(resp) => {
                        let score =
                            parse::parse_score(&resp.text, self.opts.score_min, self.opts.score_max);
                        if score.is_none() {
                            tracing::warn!(
                                judge = %juror.name,
                                sample,
                                raw = %resp.text,
                                "judge reply carried no usable score; recording null vote"
                            );
                        }
                        JudgeVote {
                            judge: juror.name.clone(),
                            raw: Some(resp.text),
                            score,
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            judge = %juror.name,
                            sample,
                            error = %err,
                            "judge call failed; recording null vote"
                        );
                        JudgeVote {
                            judge: juror.name.clone(),
                            raw: None,
                            score: None,
                        }
                    }
                };
                votes.push(vote);
            }
        }

        let (final_score, note) = reduce::reduce_verdict(&votes);
        Ok(JuryVerdict {
            final_score,
            votes,
            note,
        })
    }
}
