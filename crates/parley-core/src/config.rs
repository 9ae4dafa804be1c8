//! Run configuration: loaded once from a JSON file at startup, validated,
//! and passed into components by reference. Immutable for the duration of a
//! run; nothing reads ambient process state after load.

use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Wire protocol spoken by a provider endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-style chat-completions API (also covers deepseek-compatible
    /// endpoints).
    Openai,
    /// Anthropic messages API.
    Anthropic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_url: String,
    pub api_key: String,
}

/// One model identity: which provider endpoint to call and which model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelRef {
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(flatten)]
    pub model: ModelRef,
    #[serde(default = "default_classifier_temperature")]
    pub temperature: f32,
    #[serde(default = "default_classifier_max_tokens")]
    pub max_tokens: u32,
}

/// One configured judge identity in the jury.
#[derive(Debug, Clone, Deserialize)]
pub struct JurorConfig {
    pub name: String,
    #[serde(flatten)]
    pub model: ModelRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Provider name -> endpoint + credential. Credentials are passed
    /// through as-is; no auth logic lives here.
    pub providers: BTreeMap<String, ProviderConfig>,
    pub classifier: ClassifierConfig,
    pub jury: Vec<JurorConfig>,

    /// Completion calls per judge; a judge's vote is the reduction over its
    /// own samples (self-consistency). 1 means one call, one vote.
    #[serde(default = "default_samples_per_judge")]
    pub samples_per_judge: u32,
    /// Inclusive score bounds for a valid vote.
    #[serde(default = "default_score_min")]
    pub score_min: u8,
    #[serde(default = "default_score_max")]
    pub score_max: u8,
    #[serde(default = "default_judge_temperature")]
    pub judge_temperature: f32,
    #[serde(default = "default_judge_max_tokens")]
    pub judge_max_tokens: u32,
    /// Pause between judge calls, for rate-limit headroom. 0 disables.
    #[serde(default)]
    pub poll_delay_ms: u64,
}

fn default_classifier_temperature() -> f32 {
    0.0
}
fn default_classifier_max_tokens() -> u32 {
    50
}
fn default_samples_per_judge() -> u32 {
    1
}
fn default_score_min() -> u8 {
    1
}
fn default_score_max() -> u8 {
    5
}
fn default_judge_temperature() -> f32 {
    1.0
}
fn default_judge_max_tokens() -> u32 {
    1000
}

/// Read and validate the config file. Any failure here aborts the run
/// before a single record is processed.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: RunConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jury.is_empty() {
            return Err(ConfigError::Invalid("jury must not be empty".into()));
        }
        if self.samples_per_judge == 0 {
            return Err(ConfigError::Invalid(
                "samples_per_judge must be at least 1".into(),
            ));
        }
        if self.score_min == 0 || self.score_min > self.score_max {
            return Err(ConfigError::Invalid(format!(
                "score bounds {}..={} are not a valid range",
                self.score_min, self.score_max
            )));
        }
        for (name, provider) in &self.providers {
            if provider.api_url.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "provider `{}` has an empty api_url",
                    name
                )));
            }
            // Placeholder keys from config templates are a setup mistake,
            // not something to discover one failed call at a time.
            if provider.api_key.is_empty() || provider.api_key.starts_with("YOUR_") {
                return Err(ConfigError::Invalid(format!(
                    "provider `{}` has a placeholder or empty api_key",
                    name
                )));
            }
        }
        self.resolve_provider("classifier", &self.classifier.model.provider)?;
        for juror in &self.jury {
            self.resolve_provider(&juror.name, &juror.model.provider)?;
        }
        Ok(())
    }

    pub fn resolve_provider(
        &self,
        referent: &str,
        provider: &str,
    ) -> Result<&ProviderConfig, ConfigError> {
        self.providers
            .get(provider)
            .ok_or_else(|| ConfigError::UnknownProvider {
                referent: referent.to_string(),
                provider: provider.to_string(),
            })
    }
}
