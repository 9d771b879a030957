use serde_json::Value;

use super::types::{AlternativeUrl, Author, NormalizedMedia, ResolveError, Stats};

/// Candidate result-object fields for the direct video URL. The order is the
/// priority order and encodes which provider field wins a tie.
const VIDEO_URL_FIELDS: [&str; 8] = [
    "download_url",
    "url",
    "nowm",
    "watermark",
    "video",
    "video_url",
    "media",
    "link",
];

/// Candidate fields for the optional audio track, same matching rules.
const AUDIO_URL_FIELDS: [&str; 6] = ["music", "music_url", "audio", "audio_url", "mp3", "sound"];

const FALLBACK_TITLE: &str = "Video downloaded via aiograb";
const FALLBACK_AUTHOR: &str = "Unknown Creator";
const FALLBACK_THUMBNAIL: &str =
    "https://images.unsplash.com/photo-1611162617474-5b21e879e113?w=800&q=80";

/// JavaScript-style truthiness, which is how the upstream APIs signal success
/// and presence.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn http_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| s.starts_with("http"))
}

fn truthy_num(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .filter(|n| *n != 0),
        Value::String(s) => s.parse::<u64>().ok().filter(|n| *n != 0),
        _ => None,
    }
}

/// Picks the object the payload actually carries its answer in: a truthy
/// `result`, else a truthy `data`, else the payload itself when it carries an
/// explicit `status: true`.
fn select_result(payload: &Value) -> Result<&Value, ResolveError> {
    if is_truthy(&payload["result"]) {
        Ok(&payload["result"])
    } else if is_truthy(&payload["data"]) {
        Ok(&payload["data"])
    } else if payload["status"] == true {
        Ok(payload)
    } else {
        let details = truthy_str(&payload["message"])
            .unwrap_or("the video could not be found, it may be private or deleted")
            .to_string();
        Err(ResolveError::NotFound(details))
    }
}

/// Collapse whichever provider payload won into the canonical record.
pub fn normalize(payload: &Value) -> Result<NormalizedMedia, ResolveError> {
    let result = select_result(payload)?;

    let mut download_url = String::new();
    let mut alternative_urls = Vec::new();

    for field in VIDEO_URL_FIELDS {
        if let Some(candidate) = http_str(&result[field]) {
            if download_url.is_empty() {
                download_url = candidate.to_string();
            }
            alternative_urls.push(AlternativeUrl {
                kind: field.to_uppercase(),
                url: candidate.to_string(),
                has_ssl: candidate.starts_with("https"),
            });
        }
    }

    let mut audio_url = AUDIO_URL_FIELDS
        .iter()
        .find_map(|field| http_str(&result[field]))
        .map(str::to_string);

    // Some providers nest the links instead of exposing flat fields.
    if download_url.is_empty() {
        download_url = nested_video_url(result).unwrap_or_default();
    }
    if download_url.is_empty() {
        download_url = array_video_url(result).unwrap_or_default();
    }
    if audio_url.is_none() {
        audio_url = nested_audio_url(result);
    }

    if download_url.is_empty() {
        return Err(ResolveError::ExtractionFailed(
            "no downloadable video URL in the provider response, its schema may have changed"
                .to_string(),
        ));
    }

    if alternative_urls.is_empty() {
        alternative_urls.push(AlternativeUrl {
            kind: "DEFAULT".to_string(),
            url: download_url.clone(),
            has_ssl: true,
        });
    }

    let author = &result["author"];

    Ok(NormalizedMedia {
        title: truthy_str(&result["title"])
            .or_else(|| truthy_str(&result["desc"]))
            .or_else(|| truthy_str(&result["description"]))
            .unwrap_or(FALLBACK_TITLE)
            .to_string(),
        thumbnail: truthy_str(&result["thumbnail"])
            .or_else(|| truthy_str(&result["thumb"]))
            .or_else(|| truthy_str(&result["cover"]))
            .or_else(|| truthy_str(&result["image"]))
            .unwrap_or(FALLBACK_THUMBNAIL)
            .to_string(),
        download_url,
        audio_url,
        author: Author {
            name: truthy_str(&author["nickname"])
                .or_else(|| truthy_str(&author["name"]))
                .or_else(|| truthy_str(&result["nickname"]))
                .or_else(|| truthy_str(&result["username"]))
                .unwrap_or(FALLBACK_AUTHOR)
                .to_string(),
            avatar: truthy_str(&author["avatar"])
                .or_else(|| truthy_str(&author["image"]))
                .or_else(|| truthy_str(&result["avatar"]))
                .or_else(|| truthy_str(&result["user_avatar"]))
                .map(str::to_string),
        },
        stats: Stats {
            views: truthy_num(&result["views"])
                .or_else(|| truthy_num(&result["play_count"]))
                .unwrap_or(0),
            likes: truthy_num(&result["likes"])
                .or_else(|| truthy_num(&result["digg_count"]))
                .unwrap_or(0),
            comments: truthy_num(&result["comments"])
                .or_else(|| truthy_num(&result["comment_count"]))
                .unwrap_or(0),
            shares: truthy_num(&result["shares"])
                .or_else(|| truthy_num(&result["share_count"]))
                .unwrap_or(0),
        },
        alternative_urls,
    })
}

fn nested_video_url(result: &Value) -> Option<String> {
    let video = &result["video"];
    truthy_str(&video["url"])
        .or_else(|| truthy_str(&video["no_watermark"]))
        .or_else(|| truthy_str(video))
        .filter(|s| s.starts_with("http"))
        .map(str::to_string)
}

fn array_video_url(result: &Value) -> Option<String> {
    let first = result.as_array()?.first()?;
    truthy_str(first)
        .or_else(|| truthy_str(&first["url"]))
        .or_else(|| truthy_str(&first["link"]))
        .filter(|s| s.starts_with("http"))
        .map(str::to_string)
}

fn nested_audio_url(result: &Value) -> Option<String> {
    let music = &result["music_info"];
    truthy_str(&music["url"])
        .or_else(|| truthy_str(&music["play_url"]))
        .filter(|s| s.starts_with("http"))
        .map(str::to_string)
}
