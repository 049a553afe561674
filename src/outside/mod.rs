mod command;
mod ffmpeg;
mod network;
mod prompt;
mod ytdl;

pub use ffmpeg::{Ffmpeg, MediaMerger};
pub use network::check_connection;
pub use prompt::{Prompter, Terminal};
pub use ytdl::{StreamProvider, Ytdl};
