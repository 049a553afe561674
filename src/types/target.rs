use std::path::PathBuf;

use super::{QualityChoice, VideoRef};

/// Everything needed to download one video. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub video: VideoRef,
    pub quality: QualityChoice,
    pub out_dir: PathBuf,
    /// 1-based number prefixed to the filename of ordered playlist downloads
    pub order_index: Option<usize>,
}

impl DownloadTarget {
    pub fn is_audio(&self) -> bool {
        matches!(self.quality, QualityChoice::Audio)
    }
}
