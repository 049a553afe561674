use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use tracing::{debug, info};

use crate::{
    ask::{ask_media_kind, ask_quality},
    classifier::{Link, LinkKind},
    filename::{
        audio_companion, generate_filename, numbered, resolve_collision, sanitize_filename,
        FilenameDecision,
    },
    merge::MergePipeline,
    outside::{MediaMerger, Prompter, StreamProvider},
    playlist::{PlaylistCoordinator, PlaylistResolution},
    progress::{with_progress, ProgressReporter},
    resolver::QualityTable,
    result::{Error, Result},
    types::{DownloadTarget, MediaKind, QualityChoice, VideoRef},
};

/// What the user already decided before any prompt
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub out_dir: PathBuf,
    /// Asked for when missing, except for shorts which default to video
    pub kind: Option<MediaKind>,
    /// Resolution to use instead of asking, for video downloads
    pub resolution: Option<String>,
    /// Whether playlist entries are numbered, asked for when missing
    pub ordered: Option<bool>,
}

/// How a download run ended successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The files written, in download order
    Saved(Vec<PathBuf>),
    /// Every playlist entry already has a file in this directory
    AlreadyDownloaded(PathBuf),
    /// No playlist entry was selected
    NothingSelected,
}

/// The result of downloading one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    /// The quality the user asked for, before any nearest-match fallback
    pub quality: QualityChoice,
    /// `None` when the user canceled on a filename collision
    pub saved: Option<PathBuf>,
}

pub struct Downloader<'a> {
    provider: &'a dyn StreamProvider,
    merger: &'a dyn MediaMerger,
    prompter: &'a dyn Prompter,
    progress: &'a dyn ProgressReporter,
    scratch_prefix: &'a str,
}

impl<'a> Downloader<'a> {
    pub fn new(
        provider: &'a dyn StreamProvider,
        merger: &'a dyn MediaMerger,
        prompter: &'a dyn Prompter,
        progress: &'a dyn ProgressReporter,
        scratch_prefix: &'a str,
    ) -> Self {
        Self {
            provider,
            merger,
            prompter,
            progress,
            scratch_prefix,
        }
    }

    pub fn run(&self, link: &Link, request: &Request) -> Result<Outcome> {
        match link.kind {
            LinkKind::Video => {
                let kind = match request.kind {
                    Some(kind) => kind,
                    None => ask_media_kind(self.prompter)?,
                };
                self.single(&link.url, request, kind)
            }
            LinkKind::Short => {
                let kind = request.kind.unwrap_or(MediaKind::Video);
                self.single(&link.url, request, kind)
            }
            LinkKind::Playlist => self.playlist(&link.url, request),
            LinkKind::Unknown => Err(Error::InvalidLink(link.url.clone())),
        }
    }

    fn single(&self, url: &str, request: &Request, kind: MediaKind) -> Result<Outcome> {
        let item = self.download_one(
            url,
            &request.out_dir,
            kind,
            request.resolution.as_deref(),
            None,
        )?;

        match item.saved {
            Some(path) => Ok(Outcome::Saved(vec![path])),
            None => Err(Error::Cancelled),
        }
    }

    fn playlist(&self, url: &str, request: &Request) -> Result<Outcome> {
        let coordinator = PlaylistCoordinator::new(self.provider, self.prompter, self.progress);
        let plan = match coordinator.resolve(url, &request.out_dir, request.kind, request.ordered)? {
            PlaylistResolution::AllDownloaded(dir) => return Ok(Outcome::AlreadyDownloaded(dir)),
            PlaylistResolution::Selected(plan) => plan,
        };

        if plan.selection.is_empty() {
            return Ok(Outcome::NothingSelected);
        }
        info!(
            "Downloading {} videos of '{}'",
            plan.selection.len(),
            plan.title
        );

        // The first entry asks for the quality, the others reuse it
        let mut resolution = request.resolution.clone();
        let mut saved = Vec::with_capacity(plan.selection.len());

        for entry in &plan.selection {
            let url = VideoRef::watch_url(&entry.video_id);
            let order_index = plan.ordered.then_some(entry.position + 1);

            let item = self.download_one(
                &url,
                &plan.dir,
                plan.kind,
                resolution.as_deref(),
                order_index,
            )?;

            if resolution.is_none() {
                if let QualityChoice::Resolution(chosen) = &item.quality {
                    debug!("Using {chosen} for the rest of the playlist");
                    resolution = Some(chosen.clone());
                }
            }

            match item.saved {
                Some(path) => saved.push(path),
                None => info!("Skipped '{}'", entry.title),
            }
        }

        Ok(Outcome::Saved(saved))
    }

    /// Download one video as `kind`, at `resolution` or the one the user picks.
    ///
    /// `order_index` prefixes the filename with the playlist position.
    pub fn download_one(
        &self,
        url: &str,
        out_dir: &Path,
        kind: MediaKind,
        resolution: Option<&str>,
        order_index: Option<usize>,
    ) -> Result<ItemResult> {
        let meta = with_progress(self.progress, "Fetching the video info", || {
            self.provider.fetch_video(url)
        })?;
        println!("{} {}", "Title:".bold(), meta.video.title.cyan());

        let table = QualityTable::from_video(&meta);
        let title = sanitize_filename(&meta.video.title);
        let video_id = meta.video.id.as_str();
        let pipeline =
            MergePipeline::new(self.provider, self.merger, self.progress, self.scratch_prefix);

        if kind == MediaKind::Audio {
            let audio = table.audio()?;
            let filename = numbered(&generate_filename(&title, audio, video_id, true), order_index);
            let decision = resolve_collision(self.prompter, out_dir, &filename, |new_title| {
                numbered(&generate_filename(new_title, audio, video_id, true), order_index)
            })?;

            let saved = match decision {
                FilenameDecision::Use(filename) => {
                    let target = DownloadTarget {
                        video: meta.video.clone(),
                        quality: QualityChoice::Audio,
                        out_dir: out_dir.to_path_buf(),
                        order_index,
                    };
                    Some(pipeline.save_audio(&target, audio, &filename)?)
                }
                FilenameDecision::Cancel => None,
            };
            return Ok(ItemResult {
                quality: QualityChoice::Audio,
                saved,
            });
        }

        if table.is_empty() {
            return Err(Error::NoStreamsAvailable(meta.video.title.clone()));
        }
        let requested = match resolution {
            Some(resolution) => resolution.to_owned(),
            None => ask_quality(self.prompter, &table)?,
        };

        let video = table.resolve(&requested)?;
        let audio = table.audio()?;
        if video.resolution.as_deref() != Some(requested.as_str()) {
            info!(
                "{requested} is not available, using {}",
                video.resolution.as_deref().unwrap_or("?")
            );
        }

        let filename = numbered(&generate_filename(&title, video, video_id, false), order_index);
        let decision = resolve_collision(self.prompter, out_dir, &filename, |new_title| {
            numbered(&generate_filename(new_title, video, video_id, false), order_index)
        })?;

        let saved = match decision {
            FilenameDecision::Use(video_name) => {
                let audio_name = audio_companion(&video_name, video, audio, video_id);
                let target = DownloadTarget {
                    video: meta.video.clone(),
                    quality: QualityChoice::Resolution(requested.clone()),
                    out_dir: out_dir.to_path_buf(),
                    order_index,
                };
                Some(pipeline.download_and_merge(&target, video, audio, &video_name, &audio_name)?)
            }
            FilenameDecision::Cancel => None,
        };

        Ok(ItemResult {
            quality: QualityChoice::Resolution(requested),
            saved,
        })
    }
}
