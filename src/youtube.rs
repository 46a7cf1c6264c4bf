use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use reqwest::Client;
use url::Url;

use crate::constants::constants;

/// Length of every YouTube video id.
const VIDEO_ID_LEN: usize = 11;

fn fill_template(template: &str, video_id: &str) -> String {
  template.replace("{id}", video_id)
}

/// Thumbnail image URL for a video. Depends only on `video_id`.
pub fn thumbnail_url(video_id: &str) -> String {
  fill_template(&constants().thumbnail_url_template, video_id)
}

/// Embeddable player URL with autoplay on and related videos off.
pub fn embed_url(video_id: &str) -> String {
  fill_template(&constants().embed_url_template, video_id)
}

/// Regular watch page URL, used for playback and the browser.
pub fn watch_url(video_id: &str) -> String {
  fill_template(&constants().watch_url_template, video_id)
}

/// Whether `s` is shaped like a YouTube video id: 11 chars of `[A-Za-z0-9_-]`.
pub fn is_video_id(s: &str) -> bool {
  s.len() == VIDEO_ID_LEN && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Extract a video id from either a bare id or a YouTube URL.
///
/// Accepted URL forms:
/// - `https://youtu.be/<id>?si=...`
/// - `https://www.youtube.com/watch?v=<id>`
/// - `https://www.youtube.com/embed/<id>`
/// - `https://www.youtube.com/shorts/<id>`
pub fn parse_video_id(input: &str) -> Option<String> {
  let trimmed = input.trim();
  if is_video_id(trimmed) {
    return Some(trimmed.to_string());
  }

  let url = Url::parse(trimmed).ok()?;
  if !matches!(url.scheme(), "http" | "https") {
    return None;
  }
  let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

  let candidate = match host {
    "youtu.be" => url.path_segments()?.next().map(str::to_string),
    "youtube.com" | "youtube-nocookie.com" | "music.youtube.com" => {
      let mut segments = url.path_segments()?;
      match segments.next() {
        Some("watch") => url.query_pairs().find(|(k, _)| k == "v").map(|(_, v)| v.into_owned()),
        Some("embed" | "shorts" | "live") => segments.next().map(str::to_string),
        _ => None,
      }
    }
    _ => None,
  }?;

  is_video_id(&candidate).then_some(candidate)
}

/// Download and decode the thumbnail for `video_id`.
///
/// Tries the configured template first, then the lower resolutions YouTube
/// always provides.
pub async fn fetch_thumbnail(client: &Client, video_id: &str) -> Result<DynamicImage> {
  let thumbnail_urls = [
    thumbnail_url(video_id),
    format!("https://img.youtube.com/vi/{}/mqdefault.jpg", video_id),
    format!("https://img.youtube.com/vi/{}/0.jpg", video_id),
  ];

  for url in &thumbnail_urls {
    if let Ok(response) = client.get(url).send().await
      && response.status().is_success()
    {
      let image_bytes = response.bytes().await.with_context(|| format!("Failed to read image bytes from {}", url))?;
      let image = image::load_from_memory(&image_bytes)
        .with_context(|| format!("Failed to decode image from memory (URL: {})", url))?;
      return Ok(image);
    }
  }
  Err(anyhow!("Failed to fetch any thumbnail for video ID: {}", video_id))
}
