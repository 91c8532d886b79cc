//! Staging of multipart uploads into request-scoped temporary files.
//!
//! A [`TempUpload`] owns its file on disk and removes it when dropped, so a
//! handler holding one cleans up on every exit path.

use crate::{Error, Result};
use axum::extract::Multipart;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

const PROMPT_FIELD: &str = "prompt";

#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    file_name: Option<String>,
    content_type: Option<String>,
    size: u64,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Declared content type, or `fallback` when the client sent none.
    pub fn mime_type_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(fallback)
    }

    pub async fn read_base64(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(STANDARD.encode(bytes))
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        // Blocking on purpose: a single unlink, and Drop cannot await.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed temporary upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                "Failed to remove temporary upload: {}",
                e
            ),
        }
    }
}

/// Fields collected from a multipart form carrying a single file.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<TempUpload>,
    pub prompt: Option<String>,
}

impl UploadForm {
    /// Takes the staged file, failing with a client error when it was absent.
    pub fn require_file(&mut self, field: &str) -> Result<TempUpload> {
        self.file.take().ok_or_else(|| Error::missing_field(field))
    }
}

/// Streams the `file_field` part of `multipart` into a fresh file under
/// `upload_dir` and captures the optional `prompt` text field.
///
/// Other text fields are ignored; any other file field is rejected.
pub async fn receive(
    mut multipart: Multipart,
    file_field: &str,
    upload_dir: &Path,
) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field && form.file.is_none() {
            // The guard exists before the first byte is written so partial
            // writes are removed too.
            let mut upload = TempUpload {
                path: upload_dir.join(Uuid::new_v4().simple().to_string()),
                file_name: field.file_name().map(str::to_string),
                content_type: field.content_type().map(str::to_string),
                size: 0,
            };
            let mut file = tokio::fs::File::create(&upload.path).await?;
            while let Some(chunk) = field.chunk().await? {
                file.write_all(&chunk).await?;
                upload.size += chunk.len() as u64;
            }
            file.flush().await?;

            debug!(
                field = %name,
                path = %upload.path.display(),
                size = upload.size,
                "Staged upload"
            );
            form.file = Some(upload);
        } else if field.file_name().is_some() {
            return Err(Error::UnexpectedField(name));
        } else if name == PROMPT_FIELD {
            form.prompt = Some(field.text().await?);
        }
    }

    Ok(form)
}
