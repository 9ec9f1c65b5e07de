pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod session;
pub mod summarize;
pub mod transcript;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;

pub use error::AppError;

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("bare id pattern"));

static LINK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:v=|/)([a-zA-Z0-9_-]{11})").expect("link id pattern"));

/// A single captioned segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Canonical 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join caption segments into a single space-separated string
pub fn join_segments(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Extract the video ID from a link (or a bare ID).
///
/// The ID is the first 11-character run of `[A-Za-z0-9_-]` that directly
/// follows `v=` or a `/`. Returns `None` when nothing matches.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();

    if BARE_ID.is_match(input) {
        return Some(VideoId(input.to_string()));
    }

    LINK_ID.captures(input).map(|caps| VideoId(caps[1].to_string()))
}

/// Thumbnail image shown alongside a summary
pub fn thumbnail_url(video_id: &VideoId) -> String {
    format!("http://img.youtube.com/vi/{video_id}/0.jpg")
}
