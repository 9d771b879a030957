mod error;

pub use error::ApiError;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::relay::{StreamRelay, DEFAULT_FILENAME};
use crate::resolve::{NormalizedMedia, Resolver};

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<Resolver>,
    relay: Arc<StreamRelay>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            resolver: Arc::new(Resolver::new(
                &config.providers.primary,
                &config.providers.backups,
            )?),
            relay: Arc::new(StreamRelay::new()?),
        })
    }
}

pub async fn run(config: Config) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr))?;

    info!("Listening on http://{}", config.server.addr);

    axum::serve(listener, app).await.context("HTTP server error")
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/download", post(download))
        .route("/api/proxy-download", get(proxy_download))
        .with_state(state)
        .layer(cors)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[derive(Debug, Deserialize)]
struct DownloadRequest {
    #[serde(default)]
    url: String,
}

async fn download(
    State(state): State<AppState>,
    Json(payload): Json<DownloadRequest>,
) -> Result<Json<NormalizedMedia>, ApiError> {
    let media = state.resolver.resolve(&payload.url).await?;
    Ok(Json(media))
}

#[derive(Debug, Deserialize)]
struct ProxyParams {
    #[serde(default)]
    url: String,
    filename: Option<String>,
}

async fn proxy_download(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> Response {
    if params.url.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "URL is required").into_response();
    }

    let filename = params.filename.as_deref().unwrap_or(DEFAULT_FILENAME);

    let streamed = match state.relay.fetch(&params.url).await {
        Ok(upstream) => StreamRelay::stream_response(upstream, filename),
        Err(e) => Err(e),
    };

    match streamed {
        Ok(response) => response,
        Err(e) => {
            // Last resort: hand the client the source URL directly.
            warn!("proxy fetch failed, redirecting to origin: {}", e);
            redirect_to_origin(&params.url)
        }
    }
}

fn redirect_to_origin(url: &str) -> Response {
    match HeaderValue::from_str(url) {
        Ok(location) => {
            let mut response = StatusCode::FOUND.into_response();
            response.headers_mut().insert(header::LOCATION, location);
            response
        }
        Err(_) => (StatusCode::BAD_REQUEST, "invalid URL").into_response(),
    }
}
