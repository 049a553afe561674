/// One downloadable stream of a video, as the stream provider describes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Provider identifier used to request this exact stream
    pub format_id: String,
    /// "<digits>p", absent for audio-only streams
    pub resolution: Option<String>,
    pub mime_type: String,
    /// Container extension, e.g. "mp4" or "webm"
    pub extension: String,
    pub size_bytes: u64,
    pub is_progressive: bool,
    pub is_audio_only: bool,
}

impl StreamDescriptor {
    /// Numeric prefix of the resolution ("720p" -> 720)
    pub fn height(&self) -> Option<u64> {
        self.resolution.as_deref().and_then(parse_resolution)
    }

    pub fn is_video_only(&self) -> bool {
        !self.is_progressive && !self.is_audio_only && self.resolution.is_some()
    }
}

/// Parse the numeric prefix of a resolution string.
/// "720p" gives 720, "720" gives 720, "hd" gives None.
pub fn parse_resolution(resolution: &str) -> Option<u64> {
    resolution
        .strip_suffix('p')
        .unwrap_or(resolution)
        .parse()
        .ok()
}
