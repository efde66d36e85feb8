// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::generate::generate_handler;
use super::verify::verify_handler;
use crate::config::ServerConfig;
use crate::proof::ProofEngine;
use crate::version;

/// Room for multipart boundaries and the text fields around the image
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub const BANNER: &str = "AI Proof Vault server is running.";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProofEngine>,
    pub max_image_bytes: usize,
}

impl AppState {
    pub fn new(engine: Arc<ProofEngine>, max_image_bytes: usize) -> Self {
        Self {
            engine,
            max_image_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when the store answers, "degraded" otherwise
    pub status: &'static str,
    /// Build, feature list and record schema from `version::get_version_info`
    pub version: serde_json::Value,
    pub index_entries: Option<u64>,
    pub store: String,
    pub default_provider: String,
    pub providers: Vec<String>,
}

/// Build the router; used by `start_server` and by tests via `oneshot`
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_image_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/generate", post(generate_handler))
        .route("/api/verify", post(verify_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("AI Proof Vault listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn root_handler() -> &'static str {
    BANNER
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let index_entries = match state.engine.index_size().await {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!("Health check could not count index entries: {}", e);
            None
        }
    };

    let (status, store) = match state.engine.store_health().await {
        Ok(()) => ("ok", "ok".to_string()),
        Err(e) => ("degraded", format!("unavailable: {}", e)),
    };

    let providers = state.engine.providers();
    Json(HealthResponse {
        status,
        version: version::get_version_info(),
        index_entries,
        store,
        default_provider: providers.default_selector().to_string(),
        providers: providers.selectors(),
    })
}
