mod extension;
mod quality;
mod stream;
mod target;
mod video;

pub use extension::Extension;
pub use quality::{MediaKind, QualityChoice};
pub use stream::{parse_resolution, StreamDescriptor};
pub use target::DownloadTarget;
pub use video::{PlaylistEntry, PlaylistMetadata, VideoMetadata, VideoRef};
