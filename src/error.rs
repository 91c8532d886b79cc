use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by the inference provider. Displays the bare message.
    #[error("{0}")]
    Inference(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("unexpected field: {0}")]
    UnexpectedField(String),

    #[error("{0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// Request body the extractor refused, with the status axum chose for it.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField(name.into())
    }

    /// HTTP status a handler responds with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::UnexpectedField(_) => StatusCode::BAD_REQUEST,
            Self::Multipart(e) => e.status(),
            Self::Rejected { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
