use std::time::Duration;

use log::{debug, info, warn};

use crate::cache::TranscriptCache;
use crate::error::AppError;
use crate::session::Session;
use crate::youtube::{CaptionSource, TrackPreference, find_track};
use crate::{VideoId, join_segments};

/// Tracks tried, in order, once direct fetches are exhausted
pub const FALLBACK_PREFERENCES: [TrackPreference; 5] = [
    TrackPreference::Language("en"),
    TrackPreference::Language("en-US"),
    TrackPreference::Language("en-GB"),
    TrackPreference::GeneratedLanguage("en"),
    TrackPreference::AnyGenerated,
];

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Direct attempts before switching to the track-listing fallback
    pub max_retries: u32,
    /// Wait after the n-th consecutive failure is `n * backoff_unit`
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    /// Wait after `failures` consecutive failures, saturating instead of overflowing
    pub fn delay(&self, failures: u32) -> Duration {
        self.backoff_unit.saturating_mul(failures)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_unit: Duration::from_secs(2),
        }
    }
}

/// Fetches joined caption text, with per-session retries and a language fallback
pub struct TranscriptRetriever<S> {
    source: S,
    cache: TranscriptCache,
    policy: RetryPolicy,
}

impl<S: CaptionSource> TranscriptRetriever<S> {
    pub fn new(source: S, cache: TranscriptCache, policy: RetryPolicy) -> Self {
        Self { source, cache, policy }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    pub fn clear_cache(&mut self) {
        let dropped = self.cache.len();
        self.cache.clear();
        info!("Cleared {dropped} cached transcript(s)");
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub async fn fetch(&mut self, session: &mut Session, video_id: &VideoId) -> Result<String, AppError> {
        if let Some(segments) = self.cache.get(video_id) {
            return Ok(join_segments(segments));
        }

        while session.retry_count < self.policy.max_retries {
            match self.source.fetch_transcript(video_id).await {
                Ok(segments) => {
                    let text = join_segments(&segments);
                    self.cache.insert(video_id.clone(), segments);
                    session.retry_count = 0;
                    return Ok(text);
                }
                Err(e) => {
                    session.retry_count += 1;
                    warn!(
                        "Transcript fetch for {video_id} failed (attempt {}/{}): {e}",
                        session.retry_count, self.policy.max_retries
                    );
                    if session.retry_count < self.policy.max_retries {
                        let delay = self.policy.delay(session.retry_count);
                        debug!("Retrying in {delay:?}");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        info!("Direct fetches exhausted for {video_id}, trying caption track fallback");
        let text = self.fetch_fallback(video_id).await?;
        session.retry_count = 0;
        Ok(text)
    }

    async fn fetch_fallback(&self, video_id: &VideoId) -> Result<String, AppError> {
        let tracks = self.source.list_tracks(video_id).await.map_err(|e| {
            warn!("Listing caption tracks for {video_id} failed: {e}");
            AppError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: format!("service temporarily unavailable: {e}"),
            }
        })?;

        for preference in FALLBACK_PREFERENCES {
            let Some(track) = find_track(&tracks, preference) else {
                continue;
            };
            match self.source.fetch_track(track).await {
                Ok(segments) => {
                    info!("Fallback succeeded for {video_id} with track {preference}");
                    return Ok(join_segments(&segments));
                }
                Err(e) => debug!("Fallback track {preference} for {video_id} failed: {e}"),
            }
        }

        Err(AppError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason: "unable to access video captions".to_string(),
        })
    }
}
