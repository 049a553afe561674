use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic};
use owo_colors::OwoColorize;
use tracing::{debug, info};

use crate::{
    ask::{ask_media_kind, ask_ordered},
    filename::sanitize_filename,
    io::list_file_names,
    outside::{Prompter, StreamProvider},
    progress::{with_progress, ProgressReporter},
    result::{bail, Error, Result},
    types::{MediaKind, PlaylistEntry, VideoRef},
};

/// Directory name used when the playlist title is empty once sanitized
const UNTITLED: &str = "playlist";

/// What to download out of a playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistPlan {
    pub title: String,
    /// Subdirectory of the output path named after the playlist
    pub dir: PathBuf,
    pub kind: MediaKind,
    /// Whether filenames are prefixed with the playlist position
    pub ordered: bool,
    /// The entries picked by the user, in playlist order
    pub selection: Vec<PlaylistEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistResolution {
    Selected(PlaylistPlan),
    /// Every entry already has a file in this directory
    AllDownloaded(PathBuf),
}

/// The label an entry is shown with, and the prefix of its saved filename
pub fn entry_label(entry: &PlaylistEntry, ordered: bool) -> String {
    if ordered {
        format!("{}__{}", entry.position + 1, entry.title)
    } else {
        entry.title.clone()
    }
}

/// Remove the entries whose label prefixes one of the `existing` filenames.
///
/// Relative order is kept and an empty label never matches.
pub fn dedup(entries: Vec<PlaylistEntry>, ordered: bool, existing: &[String]) -> Vec<PlaylistEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            let label = entry_label(entry, ordered);
            let found = !label.is_empty() && existing.iter().any(|file| file.starts_with(&label));
            if found {
                debug!("'{label}' is already downloaded");
            }
            !found
        })
        .collect()
}

/// Fetch the title and id of every video concurrently, one thread per video.
///
/// The result at index `i` always describes `videos[i]`, whatever order the
/// fetches complete in. Fails if any of them fails.
pub fn fetch_entries(
    provider: &dyn StreamProvider,
    videos: &[VideoRef],
) -> Result<Vec<PlaylistEntry>> {
    let mut slots: Vec<Option<Result<VideoRef>>> = videos.iter().map(|_| None).collect();

    std::thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(videos.len());

        // Every thread owns exactly one slot
        for (i, (slot, video)) in slots.iter_mut().zip(videos).enumerate() {
            let handle = std::thread::Builder::new()
                .name(format!("fetch-{i}"))
                .spawn_scoped(scope, move || {
                    *slot = Some(provider.fetch_summary(video));
                })
                .into_diagnostic()
                .wrap_err("Could not spawn a fetching thread")?;
            handles.push(handle);
        }

        for handle in handles {
            if handle.join().is_err() {
                return bail("A fetching thread panicked");
            }
        }
        Ok(())
    })?;

    slots
        .into_iter()
        .enumerate()
        .map(|(position, slot)| match slot {
            Some(Ok(video)) => Ok(PlaylistEntry {
                title: sanitize_filename(&video.title),
                video_id: video.id,
                position,
            }),
            Some(Err(err)) => Err(err),
            None => bail(format!("No title fetched for the video #{}", position + 1)),
        })
        .collect()
}

/// Turns a playlist link into the list of entries to download
pub struct PlaylistCoordinator<'a> {
    provider: &'a dyn StreamProvider,
    prompter: &'a dyn Prompter,
    progress: &'a dyn ProgressReporter,
}

impl<'a> PlaylistCoordinator<'a> {
    pub fn new(
        provider: &'a dyn StreamProvider,
        prompter: &'a dyn Prompter,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            provider,
            prompter,
            progress,
        }
    }

    /// Ask the questions common to every entry, fetch the playlist,
    /// skip the entries already in its directory and let the user pick the rest.
    ///
    /// `kind` and `ordered` are asked for when not given.
    pub fn resolve(
        &self,
        url: &str,
        path: &Path,
        kind: Option<MediaKind>,
        ordered: Option<bool>,
    ) -> Result<PlaylistResolution> {
        let kind = match kind {
            Some(kind) => kind,
            None => ask_media_kind(self.prompter)?,
        };
        let ordered = match ordered {
            Some(ordered) => ordered,
            None => ask_ordered(self.prompter)?,
        };

        let playlist = with_progress(self.progress, "Fetching the playlist", || {
            self.provider.fetch_playlist(url)
        })?;
        let entries = with_progress(self.progress, "Fetching the videos titles", || {
            fetch_entries(self.provider, &playlist.videos)
        })?;

        println!("\n{} {}", "Playlist title:".bold(), playlist.title.cyan());
        println!("{} {}\n", "Total videos:".bold(), playlist.length);

        let dir_name = match sanitize_filename(&playlist.title) {
            name if name.is_empty() => UNTITLED.to_owned(),
            name => name,
        };
        let dir = path.join(dir_name);
        std::fs::create_dir_all(&dir)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not create directory {}", dir.display()))?;

        let existing = list_file_names(&dir)?;
        let candidates = dedup(entries, ordered, &existing);
        if candidates.is_empty() {
            info!("Every video is already downloaded in {}", dir.display());
            return Ok(PlaylistResolution::AllDownloaded(dir));
        }

        let labels: Vec<String> = candidates
            .iter()
            .map(|entry| entry_label(entry, ordered))
            .collect();
        let picked = self
            .prompter
            .ask_checkbox("Choose the videos you want to download", &labels)?
            .ok_or(Error::Cancelled)?;

        // Indexes are ascending, the selection stays in playlist order
        let selection = candidates
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| picked.contains(idx))
            .map(|(_, entry)| entry)
            .collect();

        Ok(PlaylistResolution::Selected(PlaylistPlan {
            title: playlist.title,
            dir,
            kind,
            ordered,
            selection,
        }))
    }
}
