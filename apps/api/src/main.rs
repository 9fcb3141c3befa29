mod config;
mod customization;
mod errors;
mod export;
mod guided;
mod intake;
mod llm_client;
mod routes;
mod sessions;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::ExportSettings;
use crate::intake::PdfTextSource;
use crate::llm_client::{GeminiClient, ModelGateway};
use crate::routes::build_router;
use crate::sessions::SessionRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-coach v{}", env!("CARGO_PKG_VERSION"));

    // One gateway for the whole process; sessions share the handle
    let gateway: Arc<dyn ModelGateway> = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    )?);
    info!("Model gateway initialized (model: {})", gateway.model());

    let export = ExportSettings::from_config(&config)?;

    let state = AppState {
        config: config.clone(),
        gateway,
        text_source: Arc::new(PdfTextSource),
        export: Arc::new(export),
        conversations: Arc::new(SessionRegistry::default()),
        customizations: Arc::new(SessionRegistry::default()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
