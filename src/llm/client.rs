use super::types::*;
use crate::{Error, Result, config::GeminiConfig};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// A generative-inference capability: content parts in, generated text out.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, parts: Vec<Part>) -> Result<String>;
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let model = if config.model.starts_with("models/") {
            config.model
        } else {
            format!("models/{}", config.model)
        };

        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model,
            api_key: config.api_key,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        debug!(
            model = %self.model,
            part_count = parts.len(),
            "Sending generateContent request"
        );

        let request = GenerateContentRequest::from_parts(&parts);
        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::inference(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => envelope.error.message,
                Err(_) => format!("{}: {}", status, body),
            };
            return Err(Error::inference(message));
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::inference(format!("Failed to parse response: {}", e)))?;

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(Error::inference(format!("Prompt blocked: {}", reason)));
        }

        match response.text() {
            Some(text) => {
                debug!(output_len = text.len(), "Received generateContent response");
                Ok(text)
            }
            None => {
                let finish_reason = response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .unwrap_or_else(|| "no candidates".to_string());
                Err(Error::inference(format!(
                    "Response contained no text ({})",
                    finish_reason
                )))
            }
        }
    }
}
