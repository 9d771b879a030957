use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::normalize::is_truthy;

/// Desktop user-agent the primary extraction API expects to see.
const PRIMARY_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable name of the provider
    fn name(&self) -> &str;

    /// Query the provider for the given source URL and parse its JSON payload
    async fn query(&self, client: &Client, url: &str) -> Result<Value>;
}

/// The first-choice extraction API, queried with browser-looking headers.
pub struct PrimaryProvider {
    endpoint: String,
}

impl PrimaryProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Provider for PrimaryProvider {
    fn name(&self) -> &str {
        "primary"
    }

    async fn query(&self, client: &Client, url: &str) -> Result<Value> {
        let response = client
            .get(provider_url(&self.endpoint, url))
            .header(reqwest::header::USER_AGENT, PRIMARY_USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .context("request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("provider returned HTTP {}", response.status());
        }

        response.json().await.context("invalid JSON in response")
    }
}

/// A redundant extraction API, queried bare.
pub struct BackupProvider {
    name: String,
    endpoint: String,
}

impl BackupProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let name = Url::parse(&endpoint)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .unwrap_or_else(|| endpoint.clone());
        Self { name, endpoint }
    }
}

#[async_trait]
impl Provider for BackupProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, client: &Client, url: &str) -> Result<Value> {
        let response = client
            .get(provider_url(&self.endpoint, url))
            .send()
            .await
            .context("request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("provider returned HTTP {}", response.status());
        }

        response.json().await.context("invalid JSON in response")
    }
}

fn provider_url(endpoint: &str, url: &str) -> String {
    format!("{}?url={}", endpoint, urlencoding::encode(url))
}

/// A payload is usable when the provider actually signalled success: a truthy
/// `result` or `data` field, or an explicit `status: true`.
pub fn payload_is_usable(payload: &Value) -> bool {
    is_truthy(&payload["result"]) || is_truthy(&payload["data"]) || payload["status"] == true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_url_encodes_the_source_url() {
        assert_eq!(
            provider_url(
                "https://api.example.com/aio",
                "https://www.tiktok.com/@user/video/1?lang=en"
            ),
            "https://api.example.com/aio?url=https%3A%2F%2Fwww.tiktok.com%2F%40user%2Fvideo%2F1%3Flang%3Den"
        );
    }

    #[test]
    fn backup_name_is_the_endpoint_host() {
        let backup = BackupProvider::new("https://www.tikwm.com/api/");
        assert_eq!(backup.name(), "www.tikwm.com");
    }

    #[test]
    fn usable_payload_needs_a_success_signal() {
        assert!(payload_is_usable(&json!({"result": {"url": "x"}})));
        assert!(payload_is_usable(&json!({"data": {"url": "x"}})));
        assert!(payload_is_usable(&json!({"status": true})));

        assert!(!payload_is_usable(&json!({})));
        assert!(!payload_is_usable(&json!({"status": false})));
        assert!(!payload_is_usable(&json!({"result": null, "data": ""})));
        assert!(!payload_is_usable(&json!({"message": "not found"})));
    }
}
