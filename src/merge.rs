use std::path::{Path, PathBuf};

use miette::IntoDiagnostic;
use tracing::{debug, info, warn};

use crate::{
    io::{existing, find_unused_name, move_file, scratch_dir},
    outside::{MediaMerger, StreamProvider},
    progress::{with_progress, ProgressReporter},
    result::{Error, Result},
    types::{DownloadTarget, Extension, StreamDescriptor},
};

/// Save streams to disk and mux them into one playable file
pub struct MergePipeline<'a> {
    provider: &'a dyn StreamProvider,
    merger: &'a dyn MediaMerger,
    progress: &'a dyn ProgressReporter,
    /// Prefix of the scratch directory the merged file is written to
    scratch_prefix: &'a str,
}

impl<'a> MergePipeline<'a> {
    pub fn new(
        provider: &'a dyn StreamProvider,
        merger: &'a dyn MediaMerger,
        progress: &'a dyn ProgressReporter,
        scratch_prefix: &'a str,
    ) -> Self {
        Self {
            provider,
            merger,
            progress,
            scratch_prefix,
        }
    }

    /// Save the audio stream under `filename`, it is the final file
    pub fn save_audio(
        &self,
        target: &DownloadTarget,
        audio: &StreamDescriptor,
        filename: &str,
    ) -> Result<PathBuf> {
        let path = target.out_dir.join(filename);
        self.save(target, audio, &path, "Downloading the audio")?;
        Ok(path)
    }

    /// Save the video stream under `video_name`, then the audio stream next to it
    /// and merge both into `<video stem>.mp4`. Returns the path of the merged file.
    pub fn download_and_merge(
        &self,
        target: &DownloadTarget,
        video: &StreamDescriptor,
        audio: &StreamDescriptor,
        video_name: &str,
        audio_name: &str,
    ) -> Result<PathBuf> {
        let out_dir = &target.out_dir;

        let video_path = out_dir.join(video_name);
        self.save(target, video, &video_path, "Downloading the video")?;

        // Never clobber a file the user already had
        let audio_path = {
            let name = Path::new(audio_name);
            let stem = name.file_stem().unwrap_or_default().to_string_lossy();
            find_unused_name(out_dir, &stem, Extension::Mp3.with_no_dot())?
        };
        self.save(target, audio, &audio_path, "Downloading the audio")
            .inspect_err(|_| report_leftovers(&[video_path.as_path()]))?;

        let stem = video_path.file_stem().unwrap_or_default().to_string_lossy();
        let final_path = out_dir.join(format!("{stem}{}", Extension::Mp4.with_dot()));

        with_progress(self.progress, "Merging the audio and the video", || {
            self.merge(out_dir, &video_path, &audio_path, &final_path)
        })?;

        info!("Saved {}", final_path.display());
        Ok(final_path)
    }

    fn save(
        &self,
        target: &DownloadTarget,
        stream: &StreamDescriptor,
        path: &Path,
        task: &str,
    ) -> Result<()> {
        let (dir, filename) = split(path)?;
        debug!(
            "Saving stream {} of {} ({}, audio: {}, position: {:?}) to {}",
            stream.format_id,
            target.video.id,
            target.quality,
            target.is_audio(),
            target.order_index,
            path.display()
        );

        with_progress(self.progress, task, || {
            self.provider.download(&target.video, stream, dir, &filename)
        })
        .inspect_err(|_| report_leftovers(&[path]))
    }

    fn merge(&self, out_dir: &Path, video: &Path, audio: &Path, final_path: &Path) -> Result<()> {
        let scratch = scratch_dir(out_dir, self.scratch_prefix)?;
        let file_name = final_path.file_name().unwrap_or_default();
        let merged = scratch.path().join(file_name);

        self.merger
            .merge(video, audio, &merged)
            .map_err(|err| match err {
                Error::Merge { reason, .. } => Error::Merge {
                    reason,
                    leftovers: existing(&[video, audio]),
                },
                err => err,
            })?;

        if !merged.exists() {
            return Err(Error::Merge {
                reason: "the merged file was not found in the scratch directory".to_owned(),
                leftovers: existing(&[video, audio]),
            });
        }

        // The merged file is the only complete copy until it is in place
        if let Err(err) = move_file(&merged, final_path) {
            let scratch = scratch.into_path();
            return Err(Error::Merge {
                reason: format!(
                    "the merged file could not be put in place ({})",
                    miette::Report::from(err)
                ),
                leftovers: existing(&[video, audio, merged.as_path(), scratch.as_path()]),
            });
        }

        // The video source may share its name with the merged file
        for source in [video, audio] {
            if source != final_path {
                if let Err(err) = std::fs::remove_file(source) {
                    warn!("Could not remove {}: {err}", source.display());
                }
            }
        }
        scratch.close().into_diagnostic()?;

        Ok(())
    }
}

fn split(path: &Path) -> Result<(&Path, String)> {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => Ok((dir, name.to_string_lossy().into_owned())),
        _ => Err(crate::result::err_msg(format!(
            "'{}' is not a file path",
            path.display()
        ))),
    }
}

fn report_leftovers(paths: &[&Path]) {
    for path in existing(paths) {
        warn!("{} may be incomplete, remove it manually", path.display());
    }
}
