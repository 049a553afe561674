use std::{ffi::OsStr, fmt::Debug, path::Path};

use super::command::{
    check_installed, last_line, run_command, Capture, FFMPEG, FFMPEG_QUIET_ARGS,
};
use crate::result::{Error, Result};

pub trait MediaMerger: Sync + Debug {
    /// Mux the video-only and the audio-only files into `output`.
    ///
    /// Streams are copied as is, without re-encoding.
    fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<()>;
}

/// Interface for the [ffmpeg](https://ffmpeg.org) program
#[derive(Debug)]
pub struct Ffmpeg {
    program: String,
}

impl Ffmpeg {
    /// Verify that the `ffmpeg` binary is reachable
    pub fn new(program: Option<&str>) -> Result<Self> {
        let program = program.unwrap_or(FFMPEG);
        check_installed(program, "-version")?;

        Ok(Self {
            program: program.to_owned(),
        })
    }
}

impl MediaMerger for Ffmpeg {
    fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        let res = run_command(
            &self.program,
            |cmd| {
                cmd.args(FFMPEG_QUIET_ARGS)
                    .arg("-y")
                    .args([OsStr::new("-i"), video.as_os_str()])
                    .args([OsStr::new("-i"), audio.as_os_str()])
                    .args(["-map", "0:v:0", "-map", "1:a:0"])
                    .args(["-c:v", "copy", "-c:a", "copy"])
                    .arg(output)
            },
            Capture::STDERR,
        )
        .map_err(|err| Error::Merge {
            reason: miette::Report::from(err).to_string(),
            leftovers: vec![],
        })?;

        if res.status.success() {
            Ok(())
        } else {
            Err(Error::Merge {
                reason: format!(
                    "{} exited with {}: {}",
                    self.program,
                    res.status,
                    last_line(&res.stderr)
                ),
                leftovers: vec![],
            })
        }
    }
}
