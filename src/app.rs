use log::info;

use crate::error::AppError;
use crate::export::{ArtifactKind, ExportArtifact, Exporter};
use crate::extract_video_id;
use crate::session::Session;
use crate::summarize::{TextGenerator, summarize};
use crate::transcript::TranscriptRetriever;
use crate::youtube::CaptionSource;

/// Phase of a "get content" action, reported for the busy indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingTranscript,
    GeneratingSummary,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::FetchingTranscript => write!(f, "Fetching video transcript..."),
            Stage::GeneratingSummary => write!(f, "Generating summary..."),
        }
    }
}

pub struct App<S, G> {
    retriever: TranscriptRetriever<S>,
    generator: G,
    exporter: Exporter,
}

impl<S: CaptionSource, G: TextGenerator> App<S, G> {
    pub fn new(retriever: TranscriptRetriever<S>, generator: G, exporter: Exporter) -> Self {
        Self {
            retriever,
            generator,
            exporter,
        }
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn exporter_mut(&mut self) -> &mut Exporter {
        &mut self.exporter
    }

    /// Fetch, summarize and store the summary as the session's current one.
    ///
    /// On failure the previous summary is left in place.
    pub async fn get_content<F>(&mut self, session: &mut Session, link: &str, mut on_stage: F) -> Result<(), AppError>
    where
        F: FnMut(Stage),
    {
        let video_id = extract_video_id(link).ok_or_else(|| AppError::InvalidLink {
            input: link.trim().to_string(),
        })?;

        on_stage(Stage::FetchingTranscript);
        let transcript = self.retriever.fetch(session, &video_id).await?;
        info!("Transcript for {video_id}: {} chars", transcript.len());

        on_stage(Stage::GeneratingSummary);
        let summary = summarize(&self.generator, &transcript).await?;
        info!("Summary for {video_id}: {} chars", summary.len());

        session.set_summary(video_id, summary);
        Ok(())
    }

    /// Drop cached transcripts and start the session over
    pub fn clear_cache(&mut self, session: &mut Session) {
        self.retriever.clear_cache();
        session.reset();
    }

    pub fn cached_transcripts(&self) -> usize {
        self.retriever.cached_len()
    }

    /// One artifact of the current summary; `None` before any summary exists
    pub fn download(&self, session: &Session, kind: ArtifactKind) -> Option<Result<ExportArtifact, AppError>> {
        let summary = session.current_summary.as_deref()?;
        Some(self.exporter.export(kind, summary))
    }

    /// Every available artifact of the current summary, each succeeding or failing on its own
    pub fn downloads(&self, session: &Session) -> Vec<Result<ExportArtifact, AppError>> {
        match session.current_summary.as_deref() {
            Some(summary) => self.exporter.artifacts(summary),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use eyre::{Result, bail};

    use super::*;
    use crate::cache::TranscriptCache;
    use crate::export::ExportCapability;
    use crate::transcript::RetryPolicy;
    use crate::youtube::CaptionTrack;
    use crate::{Segment, VideoId};

    struct FixedSource {
        available: bool,
        calls: Cell<u32>,
    }

    impl CaptionSource for FixedSource {
        async fn fetch_transcript(&self, _video_id: &VideoId) -> Result<Vec<Segment>> {
            self.calls.set(self.calls.get() + 1);
            if !self.available {
                bail!("captions disabled");
            }
            Ok(vec![Segment {
                text: "we talk about borrowing".to_string(),
                start: 0.0,
                duration: 3.0,
            }])
        }

        async fn list_tracks(&self, _video_id: &VideoId) -> Result<Vec<CaptionTrack>> {
            Ok(Vec::new())
        }

        async fn fetch_track(&self, _track: &CaptionTrack) -> Result<Vec<Segment>> {
            bail!("no tracks")
        }
    }

    struct EchoGenerator {
        fail: bool,
    }

    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if self.fail {
                bail!("quota exceeded");
            }
            let transcript = prompt.rsplit("content.").next().unwrap_or_default();
            Ok(format!("Heading: Summary\n{transcript}"))
        }
    }

    fn app(available: bool, fail: bool, capability: ExportCapability) -> App<FixedSource, EchoGenerator> {
        let source = FixedSource {
            available,
            calls: Cell::new(0),
        };
        let policy = RetryPolicy {
            max_retries: 2,
            backoff_unit: Duration::ZERO,
        };
        let retriever = TranscriptRetriever::new(source, TranscriptCache::default(), policy);
        App::new(retriever, EchoGenerator { fail }, Exporter::new(capability))
    }

    const LINK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[tokio::test]
    async fn test_get_content_stores_summary() {
        let mut app = app(true, false, ExportCapability::PlainTextOnly);
        let mut session = Session::new();
        let mut stages = Vec::new();

        app.get_content(&mut session, LINK, |s| stages.push(s)).await.unwrap();

        assert_eq!(stages, vec![Stage::FetchingTranscript, Stage::GeneratingSummary]);
        assert_eq!(
            session.current_summary.as_deref(),
            Some("Heading: Summary\nwe talk about borrowing")
        );
        assert_eq!(session.current_video_id.as_ref().map(|v| v.as_str()), Some("dQw4w9WgXcQ"));
        assert_eq!(app.cached_transcripts(), 1);
    }

    #[tokio::test]
    async fn test_invalid_link() {
        let mut app = app(true, false, ExportCapability::PlainTextOnly);
        let mut session = Session::new();
        let mut stages = Vec::new();

        let err = app.get_content(&mut session, "not a link", |s| stages.push(s)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidLink { ref input } if input == "not a link"));
        assert!(stages.is_empty());
        assert_eq!(session.retry_count, 0);
        assert_eq!(app.retriever_source_calls(), 0);
    }

    #[tokio::test]
    async fn test_transcript_and_generation_failures_stay_distinct() {
        let mut session = Session::new();
        let err = app(false, false, ExportCapability::PlainTextOnly)
            .get_content(&mut session, LINK, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TranscriptUnavailable { .. }));

        let mut session = Session::new();
        let err = app(true, true, ExportCapability::PlainTextOnly)
            .get_content(&mut session, LINK, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationFailure { .. }));
        assert!(session.current_summary.is_none());
    }

    #[tokio::test]
    async fn test_clear_cache_resets_session() {
        let mut app = app(true, false, ExportCapability::PlainTextOnly);
        let mut session = Session::new();
        app.get_content(&mut session, LINK, |_| {}).await.unwrap();

        app.clear_cache(&mut session);
        assert_eq!(app.cached_transcripts(), 0);
        assert!(session.current_summary.is_none());

        app.get_content(&mut session, LINK, |_| {}).await.unwrap();
        assert_eq!(app.retriever_source_calls(), 2);
    }

    #[tokio::test]
    async fn test_downloads_without_document_support() {
        let mut app = app(true, false, ExportCapability::PlainTextOnly);
        let mut session = Session::new();
        assert!(app.downloads(&session).is_empty());
        assert!(app.download(&session, ArtifactKind::PlainText).is_none());

        app.get_content(&mut session, LINK, |_| {}).await.unwrap();
        let downloads = app.downloads(&session);
        assert_eq!(downloads.len(), 1);
        let text = downloads[0].as_ref().unwrap();
        assert_eq!(text.filename, "video_summary.txt");
        assert_eq!(text.bytes, session.current_summary.as_deref().unwrap().as_bytes());

        let docx = app.download(&session, ArtifactKind::Document).unwrap();
        assert!(matches!(docx, Err(AppError::ExportCapabilityMissing)));
        assert!(app.exporter_mut().take_notice().is_some());
        assert!(app.exporter_mut().take_notice().is_none());
    }

    impl App<FixedSource, EchoGenerator> {
        fn retriever_source_calls(&self) -> u32 {
            self.retriever.source().calls.get()
        }
    }
}
