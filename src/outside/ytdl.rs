use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, Output},
};

use miette::{Context, IntoDiagnostic};
use serde::Deserialize;

use super::command::{check_installed, last_line, run_command, Capture, YT_DL, YT_DLP};
use crate::{
    result::{bail, Error, Result},
    types::{PlaylistMetadata, StreamDescriptor, VideoMetadata, VideoRef},
};

/// Interface for fetching video metadata and transferring streams to disk
pub trait StreamProvider: Sync {
    /// Get the video metadata along with every available stream
    fn fetch_video(&self, url: &str) -> Result<VideoMetadata>;

    /// Get the playlist title and its members, in playlist order.
    ///
    /// Members titles may be left empty, see [`StreamProvider::fetch_summary`].
    fn fetch_playlist(&self, url: &str) -> Result<PlaylistMetadata>;

    /// Get the display title and the id of a playlist member.
    ///
    /// Called concurrently, once per member.
    fn fetch_summary(&self, video: &VideoRef) -> Result<VideoRef>;

    /// Save the stream of the video to `out_dir/filename`.
    ///
    /// Blocks until the transfer is done.
    fn download(
        &self,
        video: &VideoRef,
        stream: &StreamDescriptor,
        out_dir: &Path,
        filename: &str,
    ) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct VideoJson {
    id: String,
    title: String,
    webpage_url: Option<String>,
    #[serde(default)]
    formats: Vec<FormatJson>,
}

#[derive(Debug, Deserialize)]
struct FormatJson {
    format_id: String,
    ext: String,
    vcodec: Option<String>,
    acodec: Option<String>,
    height: Option<u64>,
    filesize: Option<u64>,
    filesize_approx: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PlaylistJson {
    title: Option<String>,
    playlist_count: Option<usize>,
    #[serde(default)]
    entries: Vec<EntryJson>,
}

#[derive(Debug, Deserialize)]
struct EntryJson {
    id: String,
    title: Option<String>,
    url: Option<String>,
}

fn has_codec(codec: &Option<String>) -> bool {
    codec
        .as_deref()
        .is_some_and(|c| !c.is_empty() && c != "none")
}

impl FormatJson {
    /// Convert to a stream descriptor, skipping formats carrying neither audio nor video
    fn into_descriptor(self) -> Option<StreamDescriptor> {
        let has_video = has_codec(&self.vcodec);
        let has_audio = has_codec(&self.acodec);
        if !has_video && !has_audio {
            return None;
        }

        let media = if has_video { "video" } else { "audio" };
        // yt-dlp names the MP4 audio container "m4a"
        let subtype = match self.ext.as_str() {
            "m4a" => "mp4",
            ext => ext,
        };

        Some(StreamDescriptor {
            resolution: has_video
                .then_some(self.height)
                .flatten()
                .map(|h| format!("{h}p")),
            mime_type: format!("{media}/{subtype}"),
            extension: self.ext,
            size_bytes: self.filesize.or(self.filesize_approx).unwrap_or(0),
            is_progressive: has_video && has_audio,
            is_audio_only: !has_video && has_audio,
            format_id: self.format_id,
        })
    }
}

fn parse_video(json: &str) -> Result<VideoMetadata> {
    let video: VideoJson = serde_json::from_str(json)
        .into_diagnostic()
        .wrap_err("Could not parse the video json")?;

    let url = video
        .webpage_url
        .unwrap_or_else(|| VideoRef::watch_url(&video.id));
    let streams = video
        .formats
        .into_iter()
        .filter_map(FormatJson::into_descriptor)
        .collect();

    Ok(VideoMetadata {
        video: VideoRef {
            id: video.id,
            title: video.title,
            url,
        },
        streams,
    })
}

fn parse_playlist(json: &str) -> Result<PlaylistMetadata> {
    let playlist: PlaylistJson = serde_json::from_str(json)
        .into_diagnostic()
        .wrap_err("Could not parse the playlist json")?;

    let videos: Vec<VideoRef> = playlist
        .entries
        .into_iter()
        .map(|entry| VideoRef {
            url: entry.url.unwrap_or_else(|| VideoRef::watch_url(&entry.id)),
            title: entry.title.unwrap_or_default(),
            id: entry.id,
        })
        .collect();

    Ok(PlaylistMetadata {
        title: playlist.title.unwrap_or_else(|| "playlist".to_owned()),
        length: playlist.playlist_count.unwrap_or(videos.len()),
        videos,
    })
}

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
#[derive(Debug)]
pub struct Ytdl {
    program: String,
}

impl Ytdl {
    /// Verify that the given program, or else `yt-dlp` or `youtube-dl`, is reachable
    pub fn new(program: Option<&str>) -> Result<Self> {
        let candidates = match program {
            Some(program) => vec![program],
            None => vec![YT_DLP, YT_DL],
        };

        for program in candidates {
            if check_installed(program, "--version").is_ok() {
                return Ok(Self {
                    program: program.to_owned(),
                });
            }
        }

        bail("Neither yt-dlp nor youtube-dl found")
    }

    /// Run the command and check if it failed with saying the stream is unavailable.
    /// In that case, return [`Error::NoStreamsAvailable`].
    ///
    /// Other failures are returned as errors too, with the last line of stderr.
    fn run_checked<F>(&self, target: &str, f: F, capture: Capture) -> Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let res = run_command(&self.program, f, capture | Capture::STDERR)?;

        let stderr = String::from_utf8_lossy(&res.stderr);
        let is_unavailable = stderr
            .lines()
            .any(|line| line.starts_with("ERROR:") && line.to_lowercase().contains("unavailable"));
        if is_unavailable {
            Err(Error::NoStreamsAvailable(target.to_owned()))
        } else if !res.status.success() {
            bail(format!(
                "{} failed on '{target}': {}",
                self.program,
                last_line(&res.stderr)
            ))
        } else {
            Ok(res)
        }
    }
}

impl StreamProvider for Ytdl {
    fn fetch_video(&self, url: &str) -> Result<VideoMetadata> {
        let res = self.run_checked(
            url,
            |cmd| {
                cmd.arg("-q")
                    .arg("--skip-download")
                    .arg("--no-playlist")
                    .arg("-J")
                    .arg("--")
                    .arg(url)
            },
            Capture::STDOUT,
        )?;

        parse_video(&String::from_utf8_lossy(&res.stdout))
    }

    fn fetch_playlist(&self, url: &str) -> Result<PlaylistMetadata> {
        let res = self.run_checked(
            url,
            |cmd| {
                cmd.arg("-q")
                    .arg("--flat-playlist")
                    .arg("-J")
                    .arg("--")
                    .arg(url)
            },
            Capture::STDOUT,
        )?;

        parse_playlist(&String::from_utf8_lossy(&res.stdout))
    }

    fn fetch_summary(&self, video: &VideoRef) -> Result<VideoRef> {
        let res = self.run_checked(
            &video.url,
            |cmd| {
                cmd.arg("-q")
                    .arg("--skip-download")
                    .args(["--print", "%(id)s", "--print", "%(title)s"])
                    .arg("--")
                    .arg(&video.url)
            },
            Capture::STDOUT,
        )?;

        let output = String::from_utf8_lossy(&res.stdout);
        let mut lines = output.lines();
        match (lines.next(), lines.next()) {
            (Some(id), Some(title)) => Ok(VideoRef {
                id: id.trim().to_owned(),
                title: title.trim().to_owned(),
                url: video.url.clone(),
            }),
            _ => bail(format!("Could not read the title of '{}'", video.url)),
        }
    }

    fn download(
        &self,
        video: &VideoRef,
        stream: &StreamDescriptor,
        out_dir: &Path,
        filename: &str,
    ) -> Result<()> {
        let output = out_dir.join(filename);
        self.run_checked(
            &video.url,
            |cmd| {
                cmd.arg("-q")
                    .arg("--no-playlist")
                    // Or else fails when file already exists, even an empty one
                    .arg("--no-continue")
                    .arg("--force-overwrites")
                    .arg("--no-part")
                    .args(["-f", stream.format_id.as_str()])
                    .args([OsStr::new("-o"), output.as_os_str()])
                    .arg("--")
                    .arg(&video.url)
            },
            Capture::empty(),
        )
        .map_err(|err| err.wrap_err_with(|| format!("Could not save '{filename}'")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn video_json_to_streams() {
        let json = indoc! {r#"
            {
                "id": "dQw4w9WgXcQ",
                "title": "Never Gonna Give You Up",
                "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                "formats": [
                    {"format_id": "sb0", "ext": "mhtml", "vcodec": "none", "acodec": "none"},
                    {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2", "filesize": 3433514},
                    {"format_id": "18", "ext": "mp4", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "height": 360, "filesize_approx": 9000},
                    {"format_id": "136", "ext": "mp4", "vcodec": "avc1.4d401f", "acodec": "none", "height": 720}
                ]
            }
        "#};

        let meta = parse_video(json).unwrap();
        assert_eq!(meta.video.id, "dQw4w9WgXcQ");
        assert_eq!(meta.streams.len(), 3);

        let audio = &meta.streams[0];
        assert!(audio.is_audio_only);
        assert_eq!(audio.mime_type, "audio/mp4");
        assert_eq!(audio.resolution, None);
        assert_eq!(audio.size_bytes, 3433514);

        let progressive = &meta.streams[1];
        assert!(progressive.is_progressive);
        assert_eq!(progressive.size_bytes, 9000);

        let video = &meta.streams[2];
        assert!(video.is_video_only());
        assert_eq!(video.resolution.as_deref(), Some("720p"));
        assert_eq!(video.mime_type, "video/mp4");
        assert_eq!(video.size_bytes, 0);
    }

    #[test]
    fn flat_playlist_json() {
        let json = indoc! {r#"
            {
                "title": "My mix",
                "entries": [
                    {"id": "aaaaaaaaaaa", "url": "https://www.youtube.com/watch?v=aaaaaaaaaaa"},
                    {"id": "bbbbbbbbbbb", "title": "Second"}
                ]
            }
        "#};

        let playlist = parse_playlist(json).unwrap();
        assert_eq!(playlist.title, "My mix");
        assert_eq!(playlist.length, 2);
        assert_eq!(playlist.videos[0].title, "");
        assert_eq!(
            playlist.videos[1].url,
            "https://www.youtube.com/watch?v=bbbbbbbbbbb"
        );
    }

    #[test]
    fn broken_json_is_an_error() {
        assert!(parse_video("{").is_err());
        assert!(parse_playlist("[]").is_err());
    }
}
