use std::num::NonZeroUsize;

use log::debug;
use lru::LruCache;

use crate::{Segment, VideoId};

pub const DEFAULT_CAPACITY: usize = 100;

/// In-memory memo of fetched transcripts, least recently used evicted first.
///
/// Entries live for the process only; nothing is written to disk.
pub struct TranscriptCache {
    entries: LruCache<VideoId, Vec<Segment>>,
}

impl TranscriptCache {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, video_id: &VideoId) -> Option<&[Segment]> {
        let hit = self.entries.get(video_id).map(Vec::as_slice);
        if hit.is_some() {
            debug!("Cache hit: {video_id}");
        }
        hit
    }

    pub fn insert(&mut self, video_id: VideoId, segments: Vec<Segment>) {
        if let Some((evicted, _)) = self.entries.push(video_id.clone(), segments) {
            if evicted != video_id {
                debug!("Evicted cached transcript: {evicted}");
            }
        }
        debug!("Cached transcript: {video_id}");
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TranscriptCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract_video_id;

    fn vid(s: &str) -> VideoId {
        extract_video_id(s).unwrap()
    }

    fn segments(text: &str) -> Vec<Segment> {
        vec![Segment {
            text: text.to_string(),
            start: 0.0,
            duration: 1.0,
        }]
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = TranscriptCache::default();
        cache.insert(vid("aaaaaaaaaaa"), segments("hello"));
        assert_eq!(cache.get(&vid("aaaaaaaaaaa")).unwrap()[0].text, "hello");
        assert!(cache.get(&vid("bbbbbbbbbbb")).is_none());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = TranscriptCache::new(2);
        cache.insert(vid("aaaaaaaaaaa"), segments("a"));
        cache.insert(vid("bbbbbbbbbbb"), segments("b"));
        // touch "a" so "b" becomes the eviction candidate
        assert!(cache.get(&vid("aaaaaaaaaaa")).is_some());
        cache.insert(vid("ccccccccccc"), segments("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&vid("aaaaaaaaaaa")).is_some());
        assert!(cache.get(&vid("bbbbbbbbbbb")).is_none());
        assert!(cache.get(&vid("ccccccccccc")).is_some());
    }

    #[test]
    fn test_clear() {
        let mut cache = TranscriptCache::default();
        cache.insert(vid("aaaaaaaaaaa"), segments("a"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&vid("aaaaaaaaaaa")).is_none());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut cache = TranscriptCache::new(0);
        cache.insert(vid("aaaaaaaaaaa"), segments("a"));
        cache.insert(vid("bbbbbbbbbbb"), segments("b"));
        assert_eq!(cache.len(), 1);
    }
}
