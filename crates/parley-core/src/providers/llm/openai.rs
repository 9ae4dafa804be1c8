use super::{LlmClient, LlmResponse, SamplingParams};
use crate::errors::CompletionError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Client for OpenAI-style chat-completions endpoints. Deepseek and other
/// compatible providers reuse this with their own endpoint and key.
pub struct OpenAiCompatClient {
    name: String,
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(name: String, api_url: String, api_key: String, model: String) -> Self {
        Self {
            name,
            api_url,
            api_key,
            model,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn complete(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<LlmResponse, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let resp = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::from_transport(&self.name, &e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::from_status(&self.name, status.as_u16(), body));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CompletionError::malformed_response(&self.name, e.to_string()))?;

        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                CompletionError::malformed_response(&self.name, "missing choices[0].message.content")
            })?
            .to_string();

        Ok(LlmResponse {
            text,
            provider: self.name.clone(),
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}
