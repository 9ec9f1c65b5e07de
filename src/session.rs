use crate::VideoId;

/// State for one interactive session, passed into every action handler
#[derive(Debug, Default)]
pub struct Session {
    /// Consecutive direct transcript fetch failures; zero after any success
    pub retry_count: u32,
    /// The live summary; a new summary replaces it
    pub current_summary: Option<String>,
    /// Video the current summary was generated from
    pub current_video_id: Option<VideoId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything, as after a cache clear
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_summary(&mut self, video_id: VideoId, summary: String) {
        self.current_video_id = Some(video_id);
        self.current_summary = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_summary_replaces_old() {
        let mut session = Session::new();
        let first = crate::extract_video_id("aaaaaaaaaaa").unwrap();
        let second = crate::extract_video_id("bbbbbbbbbbb").unwrap();
        session.set_summary(first, "first".to_string());
        session.set_summary(second.clone(), "second".to_string());
        assert_eq!(session.current_summary.as_deref(), Some("second"));
        assert_eq!(session.current_video_id, Some(second));
    }

    #[test]
    fn test_reset() {
        let mut session = Session::new();
        session.retry_count = 5;
        session.set_summary(crate::extract_video_id("aaaaaaaaaaa").unwrap(), "text".to_string());
        session.reset();
        assert_eq!(session.retry_count, 0);
        assert!(session.current_summary.is_none());
        assert!(session.current_video_id.is_none());
    }
}
