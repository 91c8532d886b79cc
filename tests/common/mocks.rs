use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use gemini_relay::{
    Error, Result,
    llm::{InferenceClient, Part},
};
use std::sync::{Arc, Mutex};

/// Mock inference client for testing
#[derive(Debug, Clone)]
pub struct MockInferenceClient {
    pub requests: Arc<Mutex<Vec<Vec<Part>>>>,
    pub response: String,
    pub error: Option<String>,
    /// Reply with the decoded inline payload instead of `response`
    pub echo: bool,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            response: "mock output".to_string(),
            error: None,
            echo: false,
        }
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn get_requests(&self) -> Vec<Vec<Part>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        self.requests.lock().unwrap().push(parts.clone());

        if let Some(ref error) = self.error {
            return Err(Error::inference(error.clone()));
        }

        if self.echo {
            let data = parts.iter().find_map(|p| match p {
                Part::InlineData { data, .. } => Some(data.clone()),
                _ => None,
            });
            let data = data.ok_or_else(|| Error::inference("no inline data"))?;
            let bytes = STANDARD
                .decode(data)
                .map_err(|e| Error::inference(e.to_string()))?;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        Ok(self.response.clone())
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}
