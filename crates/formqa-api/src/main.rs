use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use formqa_core::config::LayeredConfig;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formqa_api::{create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formqa_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_config = ApiConfig::from_env();

    let layered = match api_config.config_path {
        Some(ref path) => LayeredConfig::with_defaults().load_from_file(path)?,
        None => LayeredConfig::with_defaults().load_default_file(std::env::current_dir()?)?,
    }
    .load_from_env();

    let settings = layered.resolve().map_err(|e| {
        tracing::error!(error = %e, "Configuration is incomplete");
        tracing::error!(
            "Remediation:\n\
            1. Set the backend credentials in formqa.toml or .env\n\
            2. Run `formqa config` to see which values are missing"
        );
        e
    })?;

    tracing::info!(
        port = api_config.port,
        backend = %settings.backend,
        top_k = settings.top_k,
        "Starting FormQA API server"
    );

    let state = Arc::new(AppState::from_settings(settings));

    let origin = api_config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin {}", api_config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = create_router(state, api_config.max_upload_bytes)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = api_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", api_config.cors_origin);

    axum::serve(listener, app).await?;
    Ok(())
}
