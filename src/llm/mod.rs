mod client;
mod types;

pub use client::{GeminiClient, InferenceClient};
pub use types::Part;
