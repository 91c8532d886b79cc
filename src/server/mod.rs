pub mod handlers;
pub mod types;
pub mod upload;

use crate::{
    Result,
    config::Config,
    llm::{GeminiClient, InferenceClient},
};
use axum::{Router, extract::DefaultBodyLimit, routing::post};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Builds the router with its four generation routes.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/generate-text", post(handlers::generate_text))
        .route("/generate-from-image", post(handlers::generate_from_image))
        .route("/generate-from-document", post(handlers::generate_from_document))
        .route("/generate-from-audio", post(handlers::generate_from_audio))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let upload_dir = std::path::PathBuf::from(&config.server.upload_dir);
    tokio::fs::create_dir_all(&upload_dir).await?;

    let client = GeminiClient::new(config.gemini.clone());
    info!("Using model {}", client.model());
    let client: Arc<dyn InferenceClient> = Arc::new(client);

    let app = router(
        AppState::new(client, upload_dir),
        config.server.max_upload_bytes,
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
