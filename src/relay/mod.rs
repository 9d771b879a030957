mod spoof;

pub use spoof::USER_AGENTS;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use spoof::{content_type_for_filename, pick_user_agent, spoofed_headers};

/// Filename used when the caller doesn't ask for one.
pub const DEFAULT_FILENAME: &str = "video_aio_gobel.mp4";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
// Per-read, so long transfers are fine but a stalled upstream is abandoned.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

pub struct StreamRelay {
    client: reqwest::Client,
    user_agents: Vec<String>,
}

impl StreamRelay {
    pub fn new() -> Result<Self> {
        Self::with_user_agents(USER_AGENTS.iter().map(|ua| ua.to_string()).collect())
    }

    /// Relay with a custom user-agent pool. Tests pass a pool of one to pin
    /// the agent the upstream sees.
    pub fn with_user_agents(user_agents: Vec<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            user_agents,
        })
    }

    /// Fetch the media bytes: a browser-looking attempt first, then one retry
    /// with nothing but the user-agent. Media CDNs differ on which one they
    /// accept.
    pub async fn fetch(&self, url: &str) -> Result<reqwest::Response> {
        let user_agent = pick_user_agent(&self.user_agents).to_string();

        match self
            .client
            .get(url)
            .headers(spoofed_headers(url, &user_agent))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => warn!(
                "upstream refused spoofed fetch with HTTP {}",
                response.status()
            ),
            Err(e) => warn!("spoofed fetch failed: {}", e),
        }

        debug!("retrying with minimal headers");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &user_agent)
            .send()
            .await
            .context("retry fetch failed")?;

        if !response.status().is_success() {
            anyhow::bail!("upstream returned HTTP {}", response.status());
        }

        Ok(response)
    }

    /// Wrap a successful upstream response into the streamed reply: the body
    /// passes through untouched while the download headers are recomputed.
    pub fn stream_response(upstream: reqwest::Response, filename: &str) -> Result<Response<Body>> {
        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|ct| *ct != "application/octet-stream")
            .map(str::to_string)
            .unwrap_or_else(|| content_type_for_filename(filename).to_string());

        let content_length = upstream.headers().get(header::CONTENT_LENGTH).cloned();

        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", urlencoding::encode(filename)),
            )
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(header::CACHE_CONTROL, "public, max-age=3600");

        if let Some(length) = content_length {
            builder = builder.header(header::CONTENT_LENGTH, length);
        }

        builder
            .body(Body::from_stream(upstream.bytes_stream()))
            .context("failed to build streamed response")
    }
}
