use eyre::{Result, bail};
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::{Segment, VideoId};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Caption language used for direct fetches
pub const DEFAULT_LANGUAGE: &str = "en";

/// A caption track advertised for a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// Auto-generated (speech recognition) rather than uploaded by the creator
    pub generated: bool,
}

/// How a fallback looks up a track among those a video offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPreference {
    /// Exact language code; uploaded tracks before generated ones
    Language(&'static str),
    /// Generated track whose language is this code or a regional variant of it
    GeneratedLanguage(&'static str),
    /// Any generated track
    AnyGenerated,
}

impl std::fmt::Display for TrackPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackPreference::Language(code) => write!(f, "{code}"),
            TrackPreference::GeneratedLanguage(code) => write!(f, "a.{code}"),
            TrackPreference::AnyGenerated => write!(f, "auto"),
        }
    }
}

/// Pick the track matching a preference, if the video has one
pub fn find_track<'a>(tracks: &'a [CaptionTrack], preference: TrackPreference) -> Option<&'a CaptionTrack> {
    match preference {
        TrackPreference::Language(code) => tracks
            .iter()
            .find(|t| !t.generated && t.language_code == code)
            .or_else(|| tracks.iter().find(|t| t.generated && t.language_code == code)),
        TrackPreference::GeneratedLanguage(code) => tracks.iter().find(|t| {
            t.generated && (t.language_code == code || t.language_code.starts_with(&format!("{code}-")))
        }),
        TrackPreference::AnyGenerated => tracks.iter().find(|t| t.generated),
    }
}

/// Where caption text comes from
#[allow(async_fn_in_trait)]
pub trait CaptionSource {
    /// Fetch the default-language transcript directly
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Vec<Segment>>;

    /// List every caption track the video offers
    async fn list_tracks(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>>;

    /// Fetch one listed track
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<Segment>>;
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<InnerTubeCaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct InnerTubeCaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    kind: Option<String>,
}

impl From<InnerTubeCaptionTrack> for CaptionTrack {
    fn from(track: InnerTubeCaptionTrack) -> Self {
        CaptionTrack {
            base_url: track.base_url,
            language_code: track.language_code,
            generated: track.kind.as_deref() == Some("asr"),
        }
    }
}

/// Caption source backed by YouTube's InnerTube API
pub struct YouTubeCaptions {
    client: reqwest::Client,
}

impl YouTubeCaptions {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn player_response(&self, video_id: &VideoId) -> Result<InnerTubePlayerResponse> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": DEFAULT_LANGUAGE,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id.as_str()
        });

        let resp = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp)
    }
}

impl CaptionSource for YouTubeCaptions {
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Vec<Segment>> {
        let tracks = self.list_tracks(video_id).await?;
        let Some(track) = find_track(&tracks, TrackPreference::Language(DEFAULT_LANGUAGE)) else {
            bail!("no '{DEFAULT_LANGUAGE}' caption track for video {video_id}");
        };
        self.fetch_track(track).await
    }

    async fn list_tracks(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>> {
        let resp = self.player_response(video_id).await?;
        let tracks = tracks_from_response(resp);

        if tracks.is_empty() {
            bail!("no captions available for video {video_id}");
        }
        debug!(
            "Caption tracks for {video_id}: {}",
            tracks
                .iter()
                .map(|t| format!("{}{}", t.language_code, if t.generated { "(auto)" } else { "" }))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(tracks)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<Segment>> {
        debug!("Fetching caption track: lang={}", track.language_code);

        // Step 3: Fetch the caption XML
        let caption_xml = self
            .client
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let segments = parse_caption_xml(&caption_xml)?;
        if segments.is_empty() {
            bail!("caption track '{}' is empty", track.language_code);
        }
        Ok(segments)
    }
}

fn tracks_from_response(resp: InnerTubePlayerResponse) -> Vec<CaptionTrack> {
    resp.captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .map(CaptionTrack::from)
        .collect()
}

fn extract_api_key(html: &str) -> Result<String> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    // Fallback: try the newer pattern
    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#)?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    bail!("could not extract InnerTube API key from watch page");
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                current_dur = dur;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(start) = current_start.take() {
                    // Some tracks omit dur on the final cue
                    let duration = current_dur.take().unwrap_or_default();
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).trim().to_string();
                    if !text.is_empty() {
                        segments.push(Segment { text, start, duration });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(segments)
}
