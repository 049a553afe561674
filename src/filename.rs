use std::path::Path;

use tracing::{debug, info};

use crate::{
    outside::Prompter,
    result::{Error, Result},
    types::{Extension, StreamDescriptor},
};

const MAX_FILENAME_LEN: usize = 255;

/// Characters removed from titles before they become filenames
const FORBIDDEN_CHARS: [char; 17] = [
    '"', '#', '$', '%', '\'', '*', ',', '.', '/', ':', ';', '<', '>', '?', '\\', '^', '|',
];

const RENAME: &str = "Rename it";
const OVERWRITE: &str = "Overwrite it";
const CANCEL: &str = "Cancel";

/// Remove the characters that are not welcome in a filename.
///
/// Applying it twice gives the same result as applying it once.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|&c| !(c.is_control() || c == '~' || FORBIDDEN_CHARS.contains(&c)))
        .take(MAX_FILENAME_LEN)
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Build "<title> - <quality>_-_<video_id>.<ext>".
///
/// The title must already be sanitized.
pub fn generate_filename(
    title: &str,
    stream: &StreamDescriptor,
    video_id: &str,
    is_audio: bool,
) -> String {
    let (quality, extension) = if is_audio {
        ("audio", Extension::Mp3.with_no_dot())
    } else {
        (
            stream.resolution.as_deref().unwrap_or("unknown"),
            stream.extension.as_str(),
        )
    };

    format!("{title} - {quality}_-_{video_id}.{extension}")
}

/// Name of the audio track saved next to `video_name` until both are merged.
///
/// Keeps whatever precedes the quality suffix of `video_name`, so renamed
/// and numbered files get a matching audio track.
pub fn audio_companion(
    video_name: &str,
    video: &StreamDescriptor,
    audio: &StreamDescriptor,
    video_id: &str,
) -> String {
    let video_suffix = generate_filename("", video, video_id, false);
    let base = video_name
        .strip_suffix(&video_suffix)
        .unwrap_or(video_name);
    format!("{base}{}", generate_filename("", audio, video_id, true))
}

/// Prefix the filename with its playlist position
pub fn numbered(filename: &str, order_index: Option<usize>) -> String {
    match order_index {
        Some(n) => format!("{n}__{filename}"),
        None => filename.to_owned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameDecision {
    Use(String),
    Cancel,
}

/// Decide which name to save the file under when `filename` may already exist in `dir`.
///
/// `regenerate` rebuilds a complete filename from a replacement title given by the user.
/// A renamed file is checked again as it may collide too.
pub fn resolve_collision<F>(
    prompter: &dyn Prompter,
    dir: &Path,
    filename: &str,
    regenerate: F,
) -> Result<FilenameDecision>
where
    F: Fn(&str) -> String,
{
    let mut filename = filename.to_owned();

    loop {
        if !dir.join(&filename).is_file() {
            return Ok(FilenameDecision::Use(filename));
        }

        info!("'{filename}' already exists");
        let choices = [RENAME, OVERWRITE, CANCEL].map(String::from);
        let answer = prompter.ask_list("Do you want to", &choices)?;

        match answer.map(|idx| choices[idx].as_str()) {
            Some(RENAME) => {
                let Some(raw) = prompter.ask_text(&format!("Rename '{filename}' to"))? else {
                    return Ok(FilenameDecision::Cancel);
                };

                let title = sanitize_filename(&raw);
                if title.is_empty() {
                    return Err(Error::InvalidFilename(raw));
                }

                filename = regenerate(&title);
                debug!("Renamed to '{filename}'");
            }
            Some(OVERWRITE) => return Ok(FilenameDecision::Use(filename)),
            _ => return Ok(FilenameDecision::Cancel),
        }
    }
}
