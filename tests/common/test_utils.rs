use super::mocks::MockInferenceClient;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use gemini_relay::server::{self, handlers::AppState};
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tempfile::TempDir;

pub const BOUNDARY: &str = "X-RELAY-TEST-BOUNDARY";

/// Build the router around `client`, staging uploads in a fresh temp directory
pub fn create_test_app(client: MockInferenceClient) -> (Router, TempDir) {
    create_test_app_with_limit(client, 20 * 1024 * 1024)
}

pub fn create_test_app_with_limit(
    client: MockInferenceClient,
    max_upload_bytes: usize,
) -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let state = AppState::new(Arc::new(client), temp_dir.path());
    (server::router(state, max_upload_bytes), temp_dir)
}

/// One multipart field: name, optional (filename, content type), body
pub struct FormField<'a> {
    pub name: &'a str,
    pub file: Option<(&'a str, Option<&'a str>)>,
    pub body: &'a [u8],
}

impl<'a> FormField<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file: None,
            body: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, file_name: &'a str, content_type: Option<&'a str>, body: &'a [u8]) -> Self {
        Self {
            name,
            file: Some((file_name, content_type)),
            body,
        }
    }
}

pub fn multipart_body(fields: &[FormField<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for field in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match field.file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        field.name, file_name
                    )
                    .as_bytes(),
                );
                if let Some(ct) = content_type {
                    body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
                }
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", field.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(field.body);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, fields: &[FormField<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn assert_json_content_type(response: &Response<Body>) {
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(content_type, "application/json");
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Number of entries left in the upload directory
pub fn staged_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
