use thiserror::Error;

/// Failures surfaced to the user by the action handlers
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid YouTube video URL. Could not extract video ID from: {input}")]
    InvalidLink { input: String },

    #[error("Transcript unavailable for {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("Summary generation failed: {reason}")]
    GenerationFailure { reason: String },

    #[error("Word document export is not available in this build")]
    ExportCapabilityMissing,

    #[error("Export failed: {reason}")]
    ExportFailed { reason: String },
}

const PROCESSING_REMEDIES: &[&str] = &[
    "Run 'clear' to clear the transcript cache",
    "Verify the video has captions/subtitles enabled",
    "Try a different video",
    "If issues persist, wait a few minutes and try again",
];

impl AppError {
    /// One-line message suitable for display; internal detail is left to the log
    pub fn headline(&self) -> &'static str {
        match self {
            AppError::InvalidLink { .. } => "Please provide a valid YouTube link.",
            AppError::TranscriptUnavailable { .. } | AppError::GenerationFailure { .. } => {
                "Unable to process video"
            }
            AppError::ExportCapabilityMissing => "Word export is disabled; only text download is available.",
            AppError::ExportFailed { .. } => "Unable to create the download",
        }
    }

    /// Suggested next steps for the user
    pub fn remedies(&self) -> &'static [&'static str] {
        match self {
            AppError::InvalidLink { .. } => &[
                "Use a link like https://www.youtube.com/watch?v=ID or https://youtu.be/ID",
                "Or paste the 11-character video ID directly",
            ],
            AppError::TranscriptUnavailable { .. } | AppError::GenerationFailure { .. } => PROCESSING_REMEDIES,
            AppError::ExportCapabilityMissing => &["Rebuild with the 'docx' feature enabled"],
            AppError::ExportFailed { .. } => &["Save the text version instead with 'save txt'"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_failures_share_headline() {
        let transcript = AppError::TranscriptUnavailable {
            video_id: "dQw4w9WgXcQ".to_string(),
            reason: "no captions".to_string(),
        };
        let generation = AppError::GenerationFailure {
            reason: "quota".to_string(),
        };
        assert_eq!(transcript.headline(), generation.headline());
        assert_eq!(transcript.remedies(), generation.remedies());
        assert!(matches!(generation, AppError::GenerationFailure { .. }));
    }

    #[test]
    fn test_headline_hides_detail() {
        let err = AppError::TranscriptUnavailable {
            video_id: "dQw4w9WgXcQ".to_string(),
            reason: "HTTP 429 from upstream".to_string(),
        };
        assert!(!err.headline().contains("429"));
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_invalid_link_remedies() {
        let err = AppError::InvalidLink {
            input: "not a link".to_string(),
        };
        assert!(err.remedies().iter().any(|r| r.contains("youtu.be")));
    }
}
