mod normalize;
mod provider;
mod types;

pub use types::{AlternativeUrl, Author, NormalizedMedia, ResolveError, Stats};

use anyhow::Context;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use normalize::normalize;
use provider::{payload_is_usable, BackupProvider, PrimaryProvider, Provider};

/// Hung providers are abandoned after this long.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);

pub struct Resolver {
    client: reqwest::Client,
    primary: PrimaryProvider,
    backups: Vec<BackupProvider>,
}

impl Resolver {
    pub fn new(primary_endpoint: &str, backup_endpoints: &[String]) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            primary: PrimaryProvider::new(primary_endpoint),
            backups: backup_endpoints
                .iter()
                .map(|endpoint| BackupProvider::new(endpoint.as_str()))
                .collect(),
        })
    }

    /// Resolve a source URL into a normalized media record.
    ///
    /// The primary provider is asked first; on a miss the backups are tried
    /// strictly in priority order and the first usable payload wins. A failing
    /// backup is only logged so the rest of the list still gets its turn.
    pub async fn resolve(&self, url: &str) -> Result<NormalizedMedia, ResolveError> {
        if url.trim().is_empty() {
            return Err(ResolveError::InvalidInput(
                "a video URL is required".to_string(),
            ));
        }

        let mut payload: Option<Value> = None;

        match self.primary.query(&self.client, url).await {
            Ok(value) => payload = Some(value),
            Err(e) => warn!("{} provider failed: {}", self.primary.name(), e),
        }

        if !payload.as_ref().is_some_and(payload_is_usable) {
            info!("primary provider missed, trying backups");
            for backup in &self.backups {
                match backup.query(&self.client, url).await {
                    Ok(value) if payload_is_usable(&value) => {
                        info!("resolved with backup provider {}", backup.name());
                        payload = Some(value);
                        break;
                    }
                    Ok(_) => debug!("backup {} returned no usable payload", backup.name()),
                    Err(e) => warn!("backup {} failed: {}", backup.name(), e),
                }
            }
        }

        // A parsed-but-unusable primary payload is still normalized: it
        // separates "the video doesn't resolve" from "nothing answered".
        let payload = payload.ok_or(ResolveError::AllProvidersOffline)?;
        debug!("winning payload: {}", payload);

        normalize(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const SOURCE_URL: &str = "https://www.tiktok.com/@user/video/1";

    #[derive(Clone)]
    struct ProviderStub {
        hits: Arc<AtomicUsize>,
        status: StatusCode,
        body: Value,
    }

    impl ProviderStub {
        fn new(status: u16, body: Value) -> Self {
            Self {
                hits: Arc::new(AtomicUsize::new(0)),
                status: StatusCode::from_u16(status).unwrap(),
                body,
            }
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    async fn serve_providers(stubs: Vec<(&'static str, ProviderStub)>) -> String {
        let mut router = Router::new();
        for (path, stub) in stubs {
            router = router.route(
                path,
                get(move || {
                    let stub = stub.clone();
                    async move {
                        stub.hits.fetch_add(1, Ordering::SeqCst);
                        (stub.status, Json(stub.body.clone()))
                    }
                }),
            );
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn resolver(base: &str, backups: &[&str]) -> Resolver {
        let backups: Vec<String> = backups.iter().map(|p| format!("{base}{p}")).collect();
        Resolver::new(&format!("{base}/primary"), &backups).unwrap()
    }

    #[tokio::test]
    async fn usable_primary_skips_backups() {
        let primary =
            ProviderStub::new(200, json!({"result": {"url": "https://cdn.example.com/v.mp4"}}));
        let backup =
            ProviderStub::new(200, json!({"result": {"url": "https://backup.example.com/v.mp4"}}));
        let base =
            serve_providers(vec![("/primary", primary.clone()), ("/b1", backup.clone())]).await;

        let media = resolver(&base, &["/b1"]).resolve(SOURCE_URL).await.unwrap();

        assert_eq!(media.download_url, "https://cdn.example.com/v.mp4");
        assert_eq!(primary.hits(), 1);
        assert_eq!(backup.hits(), 0);
    }

    #[tokio::test]
    async fn backups_are_tried_in_order_until_one_is_usable() {
        let primary = ProviderStub::new(502, json!({}));
        let bad_backup = ProviderStub::new(500, json!({}));
        let good_backup =
            ProviderStub::new(200, json!({"data": {"url": "https://backup.example.com/v.mp4"}}));
        let base = serve_providers(vec![
            ("/primary", primary.clone()),
            ("/b1", bad_backup.clone()),
            ("/b2", good_backup.clone()),
        ])
        .await;

        let media = resolver(&base, &["/b1", "/b2"])
            .resolve(SOURCE_URL)
            .await
            .unwrap();

        assert_eq!(media.download_url, "https://backup.example.com/v.mp4");
        assert_eq!(bad_backup.hits(), 1);
        assert_eq!(good_backup.hits(), 1);
    }

    #[tokio::test]
    async fn unusable_backup_payload_is_skipped() {
        let primary = ProviderStub::new(502, json!({}));
        let empty_backup = ProviderStub::new(200, json!({"status": false}));
        let good_backup =
            ProviderStub::new(200, json!({"result": {"url": "https://backup.example.com/v.mp4"}}));
        let base = serve_providers(vec![
            ("/primary", primary.clone()),
            ("/b1", empty_backup.clone()),
            ("/b2", good_backup.clone()),
        ])
        .await;

        let media = resolver(&base, &["/b1", "/b2"])
            .resolve(SOURCE_URL)
            .await
            .unwrap();

        assert_eq!(media.download_url, "https://backup.example.com/v.mp4");
        assert_eq!(empty_backup.hits(), 1);
    }

    #[tokio::test]
    async fn iteration_stops_at_the_first_usable_backup() {
        let primary = ProviderStub::new(502, json!({}));
        let first =
            ProviderStub::new(200, json!({"result": {"url": "https://first.example.com/v.mp4"}}));
        let second =
            ProviderStub::new(200, json!({"result": {"url": "https://second.example.com/v.mp4"}}));
        let base = serve_providers(vec![
            ("/primary", primary.clone()),
            ("/b1", first.clone()),
            ("/b2", second.clone()),
        ])
        .await;

        let media = resolver(&base, &["/b1", "/b2"])
            .resolve(SOURCE_URL)
            .await
            .unwrap();

        assert_eq!(media.download_url, "https://first.example.com/v.mp4");
        assert_eq!(second.hits(), 0);
    }

    #[tokio::test]
    async fn everything_dead_is_all_providers_offline() {
        let primary = ProviderStub::new(502, json!({}));
        let backup = ProviderStub::new(500, json!({}));
        let base =
            serve_providers(vec![("/primary", primary.clone()), ("/b1", backup.clone())]).await;

        let err = resolver(&base, &["/b1"])
            .resolve(SOURCE_URL)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::AllProvidersOffline));
    }

    #[tokio::test]
    async fn unusable_primary_payload_becomes_not_found() {
        let primary =
            ProviderStub::new(200, json!({"status": false, "message": "video is private"}));
        let backup = ProviderStub::new(500, json!({}));
        let base =
            serve_providers(vec![("/primary", primary.clone()), ("/b1", backup.clone())]).await;

        match resolver(&base, &["/b1"])
            .resolve(SOURCE_URL)
            .await
            .unwrap_err()
        {
            ResolveError::NotFound(details) => assert_eq!(details, "video is private"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(backup.hits(), 1);
    }

    #[tokio::test]
    async fn empty_url_is_rejected_before_any_network_call() {
        let primary =
            ProviderStub::new(200, json!({"result": {"url": "https://cdn.example.com/v.mp4"}}));
        let base = serve_providers(vec![("/primary", primary.clone())]).await;

        let err = resolver(&base, &[]).resolve("  ").await.unwrap_err();

        assert!(matches!(err, ResolveError::InvalidInput(_)));
        assert_eq!(primary.hits(), 0);
    }

    #[tokio::test]
    async fn identical_payloads_resolve_identically() {
        let primary = ProviderStub::new(
            200,
            json!({"result": {
                "url": "https://cdn.example.com/v.mp4",
                "title": "a title",
                "play_count": 12,
            }}),
        );
        let base = serve_providers(vec![("/primary", primary.clone())]).await;
        let resolver = resolver(&base, &[]);

        let first = serde_json::to_string(&resolver.resolve(SOURCE_URL).await.unwrap()).unwrap();
        let second = serde_json::to_string(&resolver.resolve(SOURCE_URL).await.unwrap()).unwrap();

        assert_eq!(first, second);
    }
}
