use std::process::{Command, Output, Stdio};

use bitflags::bitflags;
use miette::{Context, IntoDiagnostic};
use tracing::{debug, trace, Level};

use crate::result::{bail, Result};

pub const YT_DL: &str = "youtube-dl";
pub const YT_DLP: &str = "yt-dlp";
pub const FFMPEG: &str = "ffmpeg";
/// Only errors are printed by ffmpeg with these
pub const FFMPEG_QUIET_ARGS: [&str; 3] = ["-hide_banner", "-loglevel", "error"];

bitflags! {
    /// Output streams of a child process kept in memory
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capture: u8 {
        const STDOUT = 1;
        const STDERR = 1 << 1;
    }
}

impl Capture {
    fn stdio(self, stream: Capture) -> Stdio {
        if self.contains(stream) {
            Stdio::piped()
        } else {
            Stdio::null()
        }
    }
}

/// Spawn `program` with the arguments set by `build` and wait for it.
///
/// With debug logs enabled both output streams are kept and logged, whatever `capture` says.
/// A non-zero exit status is not an error here, callers look at `Output::status`.
pub fn run_command<F>(program: &str, build: F, capture: Capture) -> Result<Output>
where
    F: FnOnce(&mut Command) -> &mut Command,
{
    let verbose = tracing::enabled!(Level::DEBUG);
    let kept = if verbose { Capture::all() } else { capture };

    let mut cmd = Command::new(program);
    build(&mut cmd)
        .stdin(Stdio::null())
        .stdout(kept.stdio(Capture::STDOUT))
        .stderr(kept.stdio(Capture::STDERR));

    debug!("Running {cmd:?}");
    let output = cmd
        .output()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not start {program}, is it installed?"))?;

    if verbose {
        debug!(
            "{program} exited with {} ({} bytes on stdout, {} on stderr)",
            output.status,
            output.stdout.len(),
            output.stderr.len()
        );
        trace!("{program} stderr: {:?}", String::from_utf8_lossy(&output.stderr));
    }

    Ok(output)
}

/// Check that `program` can be started and answers `version_arg` successfully
pub fn check_installed(program: &str, version_arg: &str) -> Result<()> {
    let output = run_command(program, |cmd| cmd.arg(version_arg), Capture::empty())?;
    if output.status.success() {
        Ok(())
    } else {
        bail(format!("{program} {version_arg} exited with {}", output.status))
    }
}

/// Last non empty line of a captured stream, used to explain a failure
pub fn last_line(stream: &[u8]) -> String {
    String::from_utf8_lossy(stream)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no output")
        .to_owned()
}
