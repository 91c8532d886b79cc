use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GenerateTextRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub output: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
