mod ask;
mod classifier;
mod cli;
mod download;
mod filename;
mod io;
mod logging;
mod merge;
mod outside;
mod playlist;
mod progress;
mod resolver;
mod result;
mod settings;
mod types;

#[cfg(test)]
mod testing;

use clap::Parser;
use miette::{miette, Context, IntoDiagnostic};
use owo_colors::OwoColorize;
use tracing::{debug, info};

use crate::{
    classifier::classify,
    cli::Args,
    download::{Downloader, Outcome},
    outside::{check_connection, Ffmpeg, Terminal, Ytdl},
    settings::Settings,
};

fn main() -> miette::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_level())?;
    let settings = Settings::load(args.config.as_deref())?;

    // Make sure the output directory exists
    std::fs::create_dir_all(&args.path)
        .into_diagnostic()
        .wrap_err("Could not create the output directory")?;

    if settings.check_network {
        debug!("Checking the connection to {}", settings.probe_address);
        check_connection(&settings.probe_address, settings.probe_timeout())?;
    }

    let link = classify(&args.url).known()?;
    info!("Got a {:?} link: {}", link.kind, link.url);
    debug!("Link id: {:?}", link.id);

    let (ytdl, ffmpeg) = load_external_components(&settings)?;
    let prompter = Terminal;

    let outcome = {
        let progress = progress::for_stderr();
        let downloader = Downloader::new(
            &ytdl,
            &ffmpeg,
            &prompter,
            progress.as_ref(),
            &settings.scratch_dir,
        );
        downloader.run(&link, &args.request())?
    };

    match outcome {
        Outcome::Saved(paths) if paths.is_empty() => {
            println!("{}", "Nothing was downloaded".yellow());
        }
        Outcome::Saved(paths) => {
            for path in &paths {
                debug!("Saved {}", path.display());
            }
            println!("\n{}", "✅ Download completed".green().bold());
        }
        Outcome::AlreadyDownloaded(dir) => println!(
            "{} see '{}'",
            "The whole playlist is already downloaded in this directory,".green(),
            dir.display()
        ),
        Outcome::NothingSelected => println!("{}", "No video selected".yellow()),
    }

    Ok(())
}

/// Load the external components
fn load_external_components(settings: &Settings) -> miette::Result<(Ytdl, Ffmpeg)> {
    // Construct the handles concurrently as executing an external program
    // is not instantaneous. That way we can avoid adding the costs
    std::thread::scope(|scope| {
        let ytdl_thread = scope.spawn(|| Ytdl::new(settings.yt_dlp.as_deref()));
        let ffmpeg_thread = scope.spawn(|| Ffmpeg::new(Some(settings.ffmpeg.as_str())));

        let ytdl = ytdl_thread
            .join()
            .map_err(|_| miette!("Could not join the yt-dlp thread"))??;
        let ffmpeg = ffmpeg_thread
            .join()
            .map_err(|_| miette!("Could not join the ffmpeg thread"))??;

        Ok((ytdl, ffmpeg))
    })
}
