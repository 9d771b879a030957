use rand::seq::IndexedRandom;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use url::Url;

/// Realistic desktop browser strings the relay rotates through.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15",
];

/// Uniform pick from the pool; an empty pool falls back to the first stock
/// agent so a misconfigured relay still sends something plausible.
pub fn pick_user_agent(pool: &[String]) -> &str {
    pool.choose(&mut rand::rng())
        .map(String::as_str)
        .unwrap_or(USER_AGENTS[0])
}

/// Full browser-looking header set for the first fetch attempt. Referer and
/// Origin mirror the target's own scheme and host; an unparseable URL just
/// leaves them out.
pub fn spoofed_headers(url: &str, user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, header::USER_AGENT, user_agent);
    insert(&mut headers, header::ACCEPT, "*/*");
    // Identity keeps upstream content-length meaningful for passthrough.
    insert(&mut headers, header::ACCEPT_ENCODING, "identity");
    insert(&mut headers, header::CONNECTION, "keep-alive");
    insert(&mut headers, header::CACHE_CONTROL, "no-cache");
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("cross-site"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("no-cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("video"),
    );

    if let Some(origin) = site_origin(url) {
        insert(&mut headers, header::REFERER, &format!("{origin}/"));
        insert(&mut headers, header::ORIGIN, &origin);
    }

    headers
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

fn site_origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(format!("{}://{}", parsed.scheme(), host))
}

/// Content type for the download when the upstream doesn't state a real one.
pub fn content_type_for_filename(filename: &str) -> &'static str {
    if filename.to_ascii_lowercase().ends_with(".mp3") {
        "audio/mpeg"
    } else {
        "video/mp4"
    }
}
