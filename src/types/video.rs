use super::StreamDescriptor;

/// Identify a single video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    /// 11 characters from `[A-Za-z0-9_-]`
    pub id: String,
    pub title: String,
    pub url: String,
}

impl VideoRef {
    pub fn watch_url(id: &str) -> String {
        format!("https://www.youtube.com/watch?v={id}")
    }
}

/// A video along with every stream it can be downloaded from
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub video: VideoRef,
    pub streams: Vec<StreamDescriptor>,
}

#[derive(Debug, Clone)]
pub struct PlaylistMetadata {
    pub title: String,
    pub length: usize,
    /// Members in playlist order. Titles may be missing until fetched.
    pub videos: Vec<VideoRef>,
}

/// A playlist member whose title has been fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Sanitized title, possibly prefixed with the position when numbering is on
    pub title: String,
    pub video_id: String,
    /// Zero-based position in the playlist
    pub position: usize,
}
