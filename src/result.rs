use std::{fmt::Display, path::PathBuf};

use miette::miette;

#[derive(Debug)]
pub enum Error {
    /// The input is neither a video, a short nor a playlist link
    InvalidLink(String),

    /// The connectivity probe did not reach its target
    NetworkUnavailable(String),

    /// No usable stream for the video with this title
    NoStreamsAvailable(String),

    /// A replacement filename given by the user is empty after sanitization
    InvalidFilename(String),

    /// The merge tool failed. Files in `leftovers` may still be on disk.
    Merge {
        reason: String,
        leftovers: Vec<PathBuf>,
    },

    /// The user answered "Cancel" or interrupted a prompt
    Cancelled,

    Miette(miette::Report),
}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidLink(link) => miette!(
                help = "Give a video, short or playlist link, or an 11 characters video id",
                "Invalid link: '{link}'"
            ),
            Error::NetworkUnavailable(reason) => miette!("No internet connection ({reason})"),
            Error::NoStreamsAvailable(title) => {
                miette!("No stream available for the video '{title}'")
            }
            Error::InvalidFilename(name) => miette!("Invalid filename: '{name}'"),
            Error::Merge { reason, leftovers } if leftovers.is_empty() => {
                miette!("Could not merge the audio and video streams: {reason}")
            }
            Error::Merge { reason, leftovers } => {
                let files = leftovers
                    .iter()
                    .map(|p| format!("  {}", p.display()))
                    .collect::<Vec<_>>()
                    .join("\n");
                miette!(
                    help = format!("These files were left behind, remove them manually:\n{files}"),
                    "Could not merge the audio and video streams: {reason}"
                )
            }
            Error::Cancelled => miette!("Download canceled"),
            Error::Miette(err) => err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Miette(miette::Report::msg(err.to_string()))
    }
}

impl Error {
    pub fn wrap_err_with<D, F>(self, f: F) -> Error
    where
        D: Display + Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        match self {
            Error::Miette(report) => Error::Miette(report.wrap_err(f())),
            err => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Build a catch-all error from a message
pub fn err_msg<D: Display + std::fmt::Debug + Send + Sync + 'static>(msg: D) -> Error {
    Error::Miette(miette::Report::msg(msg))
}

/// Shortcut for `Err(err_msg(msg))`
pub fn bail<T, D: Display + std::fmt::Debug + Send + Sync + 'static>(msg: D) -> Result<T> {
    Err(err_msg(msg))
}
