use tracing::debug;

use crate::{
    result::{bail, Error, Result},
    types::{parse_resolution, StreamDescriptor, VideoMetadata},
};

const ONE_KB: u64 = 1024;
const ONE_MB: u64 = ONE_KB * 1024;
const ONE_GB: u64 = ONE_MB * 1024;

/// Render a byte count the way the quality prompt shows it
pub fn format_size(bytes: u64) -> String {
    let bytes_f = bytes as f64;
    if bytes >= ONE_GB {
        format!("{:.4} GB", bytes_f / ONE_GB as f64)
    } else if bytes >= ONE_MB {
        format!("{:.2} MB", bytes_f / ONE_MB as f64)
    } else {
        format!("{:.2} KB", bytes_f / ONE_KB as f64)
    }
}

/// The qualities a video can be downloaded at, sorted by ascending resolution
#[derive(Debug, Clone)]
pub struct QualityTable {
    title: String,
    pub resolutions: Vec<String>,
    /// Estimated size of the final file, one per resolution
    pub sizes: Vec<String>,
    /// Video-only adaptive MP4 streams, in provider order
    pub video_streams: Vec<StreamDescriptor>,
    pub audio_stream: Option<StreamDescriptor>,
}

impl QualityTable {
    pub fn from_video(video: &VideoMetadata) -> Self {
        let streams = &video.streams;

        let video_streams: Vec<StreamDescriptor> = streams
            .iter()
            .filter(|s| s.is_video_only() && s.mime_type == "video/mp4")
            .cloned()
            .collect();
        let audio_stream = pick_audio_stream(streams).cloned();
        let audio_size = audio_stream.as_ref().map_or(0, |s| s.size_bytes);

        // Keep the first stream of every resolution, it is the one resolve() would pick
        let mut rows: Vec<(&str, u64)> = Vec::with_capacity(video_streams.len());
        for stream in &video_streams {
            let Some(resolution) = stream.resolution.as_deref() else {
                continue;
            };
            if rows.iter().any(|(res, _)| *res == resolution) {
                continue;
            }

            let size = if stream.is_progressive {
                stream.size_bytes
            } else {
                stream.size_bytes + audio_size
            };
            rows.push((resolution, size));
        }

        // Stable, non numeric resolutions go last
        rows.sort_by_key(|(res, _)| parse_resolution(res).unwrap_or(u64::MAX));

        let resolutions = rows.iter().map(|(res, _)| res.to_string()).collect();
        let sizes = rows.iter().map(|&(_, size)| format_size(size)).collect();

        Self {
            title: video.video.title.clone(),
            resolutions,
            sizes,
            video_streams,
            audio_stream,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.video_streams.is_empty()
    }

    /// Labels shown by the quality prompt, one per resolution
    pub fn labels(&self) -> Vec<String> {
        self.resolutions
            .iter()
            .zip(&self.sizes)
            .map(|(res, size)| format!("{res} ~= {size}"))
            .collect()
    }

    /// The video stream to download for the requested resolution.
    /// Falls back to the nearest resolution if the exact one is missing.
    pub fn resolve(&self, requested: &str) -> Result<&StreamDescriptor> {
        if self.video_streams.is_empty() {
            return Err(Error::NoStreamsAvailable(self.title.clone()));
        }
        resolve_quality(requested, &self.video_streams)
    }

    pub fn audio(&self) -> Result<&StreamDescriptor> {
        self.audio_stream
            .as_ref()
            .ok_or_else(|| Error::NoStreamsAvailable(self.title.clone()))
    }
}

/// First audio-only stream, by mime type order
pub fn pick_audio_stream(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    let mut audio: Vec<&StreamDescriptor> = streams.iter().filter(|s| s.is_audio_only).collect();
    audio.sort_by(|a, b| a.mime_type.cmp(&b.mime_type));
    audio.first().copied()
}

/// Find the stream with the requested resolution.
///
/// Without an exact match, the stream whose resolution is numerically the
/// closest is chosen, the first one in `streams` winning ties.
pub fn resolve_quality<'a>(
    requested: &str,
    streams: &'a [StreamDescriptor],
) -> Result<&'a StreamDescriptor> {
    if let Some(stream) = streams
        .iter()
        .find(|s| s.resolution.as_deref() == Some(requested))
    {
        return Ok(stream);
    }

    let Some(wanted) = parse_resolution(requested) else {
        return bail(format!("'{requested}' is not a resolution"));
    };

    let nearest = streams
        .iter()
        .filter_map(|s| s.height().map(|h| (s, h.abs_diff(wanted))))
        .min_by_key(|&(_, diff)| diff)
        .map(|(s, _)| s);

    match nearest {
        Some(stream) => {
            debug!(
                "{requested} is unavailable, falling back to {}",
                stream.resolution.as_deref().unwrap_or("?")
            );
            Ok(stream)
        }
        None => bail("No stream with a numeric resolution"),
    }
}
