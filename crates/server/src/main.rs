use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use services::{service_middleware, ServiceState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod subsystems;

use config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let registry =
        subsystems::build_registry(&settings).context("failed to build service registry")?;
    if registry.is_empty() {
        warn!("no service dispatchers registered");
    }
    info!(
        count = registry.len(),
        subsystems = ?registry.names(),
        "service registry ready"
    );

    let state =
        ServiceState::new(Arc::new(registry)).with_body_limit(settings.max_service_body_bytes);
    let app = build_router(state);

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: ServiceState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state, service_middleware))
}

async fn index() -> Html<&'static str> {
    Html("<!doctype html><title>portal</title><h1>portal</h1>")
}

async fn healthz() -> &'static str {
    "ok"
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
