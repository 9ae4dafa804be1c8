//! Remote completion clients.
//!
//! One call, one response: no caching, no batching, no retry. Provider
//! quirks live behind the [`LlmClient`] trait so the classifier and jury
//! never see them, and tests substitute scripted clients.

mod anthropic;
mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiCompatClient;

use crate::config::{ModelRef, ProviderKind, RunConfig};
use crate::errors::{CompletionError, ConfigError};
use async_trait::async_trait;
use std::sync::Arc;

/// Per-call sampling knobs, passed through to the provider verbatim.
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one prompt to the configured model and return the raw reply text.
    async fn complete(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<LlmResponse, CompletionError>;

    fn provider_name(&self) -> &str;
}

/// Build a client for one model identity from the run config.
pub fn build_client(
    cfg: &RunConfig,
    referent: &str,
    model: &ModelRef,
) -> Result<Arc<dyn LlmClient>, ConfigError> {
    let provider = cfg.resolve_provider(referent, &model.provider)?;
    let client: Arc<dyn LlmClient> = match provider.kind {
        ProviderKind::Openai => Arc::new(OpenAiCompatClient::new(
            model.provider.clone(),
            provider.api_url.clone(),
            provider.api_key.clone(),
            model.model.clone(),
        )),
        ProviderKind::Anthropic => Arc::new(AnthropicClient::new(
            model.provider.clone(),
            provider.api_url.clone(),
            provider.api_key.clone(),
            model.model.clone(),
        )),
    };
    Ok(client)
}
