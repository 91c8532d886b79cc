use super::{
    types::{ErrorResponse, GenerateResponse, GenerateTextRequest},
    upload::{self, TempUpload},
};
use crate::{
    Error, Result,
    llm::{InferenceClient, Part},
};
use axum::{
    extract::{
        Multipart, State,
        multipart::MultipartRejection, rejection::JsonRejection,
    },
    http::StatusCode,
    response::Json,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};

pub const DEFAULT_IMAGE_PROMPT: &str = "Describe the image";
pub const DOCUMENT_PROMPT: &str = "Analyze this document:";
pub const AUDIO_PROMPT: &str = "Transcribe or analyze the following audio:";

const FALLBACK_IMAGE_MIME: &str = "image/png";
const FALLBACK_MIME: &str = "application/octet-stream";

type HandlerResult = std::result::Result<Json<GenerateResponse>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn InferenceClient>,
    pub upload_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(client: Arc<dyn InferenceClient>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            upload_dir: Arc::new(upload_dir.into()),
        }
    }
}

/// Every outcome, extractor rejections included, leaves as JSON.
fn respond(route: &str, result: Result<String>) -> HandlerResult {
    match result {
        Ok(output) => {
            info!(route, output_len = output.len(), "Generated content");
            Ok(Json(GenerateResponse { output }))
        }
        Err(e) => {
            let status = e.status_code();
            error!(route, status = status.as_u16(), "Request failed: {}", e);
            Err((
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

pub async fn generate_text(
    State(state): State<AppState>,
    request: std::result::Result<Json<GenerateTextRequest>, JsonRejection>,
) -> HandlerResult {
    let result = async move {
        let Json(request) = request?;
        let prompt = request
            .prompt
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::missing_field("prompt"))?;
        info!(prompt_len = prompt.len(), "Received text generation request");
        state.client.generate(vec![Part::Text(prompt)]).await
    }
    .await;

    respond("generate-text", result)
}

pub async fn generate_from_image(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    let result = async move {
        let mut form = upload::receive(multipart?, "image", &state.upload_dir).await?;
        let image = form.require_file("image")?;
        let prompt = form
            .prompt
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_PROMPT.to_string());

        generate_with_file(&state, prompt, &image, FALLBACK_IMAGE_MIME).await
    }
    .await;

    respond("generate-from-image", result)
}

pub async fn generate_from_document(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    let result = async move {
        let mut form = upload::receive(multipart?, "document", &state.upload_dir).await?;
        let document = form.require_file("document")?;

        generate_with_file(&state, DOCUMENT_PROMPT.to_string(), &document, FALLBACK_MIME).await
    }
    .await;

    respond("generate-from-document", result)
}

pub async fn generate_from_audio(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> HandlerResult {
    let result = async move {
        let mut form = upload::receive(multipart?, "audio", &state.upload_dir).await?;
        let audio = form.require_file("audio")?;

        generate_with_file(&state, AUDIO_PROMPT.to_string(), &audio, FALLBACK_MIME).await
    }
    .await;

    respond("generate-from-audio", result)
}

/// Sends `[prompt, file]` to the inference client. The caller keeps
/// ownership of the upload, which is removed when the caller's scope ends.
async fn generate_with_file(
    state: &AppState,
    prompt: String,
    upload: &TempUpload,
    fallback_mime: &str,
) -> Result<String> {
    let mime_type = upload.mime_type_or(fallback_mime).to_string();
    info!(
        file_name = upload.file_name().unwrap_or("unnamed"),
        mime_type = %mime_type,
        size = upload.size(),
        "Received file generation request"
    );

    let data = upload.read_base64().await?;
    state
        .client
        .generate(vec![Part::Text(prompt), Part::inline_data(mime_type, data)])
        .await
}
