use std::path::PathBuf;

use clap::{ArgAction, Parser};
use indoc::indoc;

use crate::{
    download::Request,
    types::{MediaKind, QualityChoice},
};

macro_rules! arg_env {
    ($v:literal) => {
        concat!("TUBEFETCH_", $v)
    };
}

/// Download a YouTube video, short or playlist, as audio only or as video at a chosen quality.
///
/// Needs `yt-dlp` (or `youtube-dl`) and `ffmpeg` to be installed.
#[derive(Parser, Debug)]
#[command(version, after_help = indoc! {"
    Examples:
      tubefetch dQw4w9WgXcQ
      tubefetch -a 'https://youtu.be/dQw4w9WgXcQ' ~/Music
      tubefetch -q 720p -o 'https://www.youtube.com/playlist?list=PL...' ~/Videos
"})]
pub struct Args {
    /// The link of the video, short or playlist, or a video id
    #[arg(env = arg_env!("URL"))]
    pub url: String,

    /// The directory to save the files to, created if missing.
    /// Playlists are saved in a subdirectory named after them.
    #[arg(default_value = ".", env = arg_env!("PATH"))]
    pub path: PathBuf,

    /// Save the audio only, without asking
    #[arg(short, long, conflicts_with = "footage", env = arg_env!("AUDIO"))]
    pub audio: bool,

    /// Save the video with its audio, without asking
    #[arg(short, long, env = arg_env!("FOOTAGE"))]
    pub footage: bool,

    /// The resolution to download at, such as `720p`, or `audio`.
    /// The nearest resolution is used when a video does not have it.
    #[arg(short, long, env = arg_env!("QUALITY"))]
    pub quality: Option<QualityChoice>,

    /// Prefix the playlist files with their position, without asking
    #[arg(short, long, env = arg_env!("ORDERED"))]
    pub ordered: bool,

    /// TOML file with the settings of the external programs and the network check
    #[arg(long, env = arg_env!("CONFIG"))]
    pub config: Option<PathBuf>,

    /// Show more logs, can be repeated
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// The answers already given on the command line
    pub fn request(&self) -> Request {
        let kind = if self.audio {
            Some(MediaKind::Audio)
        } else if let Some(quality) = &self.quality {
            Some(quality.kind())
        } else {
            self.footage.then_some(MediaKind::Video)
        };
        let resolution = match &self.quality {
            Some(QualityChoice::Resolution(res)) => Some(res.clone()),
            _ => None,
        };

        Request {
            out_dir: self.path.clone(),
            kind,
            resolution,
            ordered: self.ordered.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_to_request() {
        let args = Args::try_parse_from(["tubefetch", "dQw4w9WgXcQ", "out", "-q", "1080", "-o"]).unwrap();
        let request = args.request();
        assert_eq!(request.out_dir, PathBuf::from("out"));
        assert_eq!(request.kind, Some(MediaKind::Video));
        assert_eq!(request.resolution.as_deref(), Some("1080p"));
        assert_eq!(request.ordered, Some(true));

        let args = Args::try_parse_from(["tubefetch", "dQw4w9WgXcQ", "-a"]).unwrap();
        let request = args.request();
        assert_eq!(request.out_dir, PathBuf::from("."));
        assert_eq!(request.kind, Some(MediaKind::Audio));
        assert_eq!(request.resolution, None);
        assert_eq!(request.ordered, None);

        let args = Args::try_parse_from(["tubefetch", "dQw4w9WgXcQ"]).unwrap();
        assert_eq!(args.request().kind, None);
    }

    #[test]
    fn audio_and_footage_conflict() {
        assert!(Args::try_parse_from(["tubefetch", "dQw4w9WgXcQ", "-a", "-f"]).is_err());
        assert!(Args::try_parse_from(["tubefetch", "dQw4w9WgXcQ", "-q", "best"]).is_err());
    }

    #[test]
    fn verbosity() {
        let args = Args::try_parse_from(["tubefetch", "x", "-vv"]).unwrap();
        assert_eq!(args.log_level(), tracing::Level::TRACE);
    }
}
