use std::{path::Path, time::Duration};

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use miette::{Context, IntoDiagnostic};
use serde::Deserialize;
use tracing::debug;

use crate::result::Result;

const ENV_PREFIX: &str = "TUBEFETCH";

/// Settings that rarely change between runs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Program used to fetch metadata and streams, `yt-dlp` or `youtube-dl` when unset
    pub yt_dlp: Option<String>,
    /// Program used to merge the audio and video streams
    pub ffmpeg: String,
    /// `host:port` the connectivity probe connects to
    pub probe_address: String,
    pub probe_timeout_secs: u64,
    /// Prefix of the directory the merged file is written to before being moved
    pub scratch_dir: String,
    pub check_network: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            yt_dlp: None,
            ffmpeg: "ffmpeg".to_owned(),
            probe_address: "www.google.com:443".to_owned(),
            probe_timeout_secs: 5,
            scratch_dir: "output".to_owned(),
            check_network: true,
        }
    }
}

impl Settings {
    /// Read the settings from the optional TOML file, then from `TUBEFETCH_*` variables
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            debug!("Reading settings from {}", file.display());
            builder = builder.add_source(File::from(file).format(FileFormat::Toml));
        }

        build(builder, Environment::with_prefix(ENV_PREFIX))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

fn build(builder: ConfigBuilder<DefaultState>, env: Environment) -> Result<Settings> {
    let settings = builder
        .add_source(env.try_parsing(true))
        .build()
        .into_diagnostic()
        .wrap_err("Could not read the settings")?
        .try_deserialize()
        .into_diagnostic()
        .wrap_err("Invalid settings")?;

    debug!("{settings:?}");
    Ok(settings)
}
