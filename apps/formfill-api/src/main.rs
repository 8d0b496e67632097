//! FormFill API Server - Backend for guided government-form filling
//!
//! Provides REST endpoints for:
//! - Document upload and form-structure extraction (with guaranteed fallback)
//! - Chat-driven field-by-field fill sessions
//! - Translation between supported languages
//! - Final document generation and download

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod clients;
mod error;
mod extract;
mod handlers;
mod models;
mod state;

use clients::{HttpInferenceClient, HttpTranslator, TextRenderer};
use state::AppState;

/// Command-line arguments for the FormFill server
#[derive(Parser, Debug)]
#[command(name = "formfill-api")]
#[command(about = "FormFill API server for form extraction and fill sessions")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3002")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Endpoint of the model-inference collaborator
    #[arg(long, env = "INFERENCE_URL", default_value = "http://localhost:8089/v1/complete")]
    inference_url: String,

    /// Endpoint of the translation collaborator
    #[arg(long, env = "TRANSLATE_URL", default_value = "http://localhost:8090/translate")]
    translate_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_directive = if args.verbose {
        "formfill_api=debug,formfill_engine=debug,tower_http=debug"
    } else {
        "formfill_api=info,formfill_engine=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    info!("Initializing FormFill API...");

    // Collaborators are built once and passed by reference everywhere
    let state = Arc::new(AppState::new(
        Arc::new(HttpInferenceClient::new(args.inference_url.clone())),
        Arc::new(HttpTranslator::new(args.translate_url.clone())),
        Arc::new(TextRenderer),
    ));

    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/upload", post(handlers::upload))
        .route("/api/chat", post(handlers::chat))
        .route("/api/translate", post(handlers::translate))
        .route("/api/generate", post(handlers::generate))
        .route("/api/download/:id", get(handlers::download))
        .route("/api/session/:id", delete(handlers::cancel_session))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting FormFill API on http://{}", addr);
    info!("Inference collaborator: {}", args.inference_url);
    info!("Translation collaborator: {}", args.translate_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
