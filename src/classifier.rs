use std::sync::OnceLock;

use regex::Regex;

use crate::{
    result::{Error, Result},
    types::VideoRef,
};

/// Optional scheme and optional "www."
macro_rules! opt_scheme_www {
    () => {
        r#"^(?:https?://)?(?:www\.)?"#
    };
}
/// A video id: exactly 11 characters from the id alphabet
macro_rules! video_id {
    () => {
        r#"(?P<id>[A-Za-z0-9_-]{11})"#
    };
}
/// Every path a regular video can be reached from
macro_rules! video_paths {
    () => {
        concat!(
            r#"(?:youtube(?:-nocookie)?\.com/"#,
            r#"(?:watch\?v=|watch\?feature=share&v=|embed/|v/|live_stream\?channel=|live/)"#,
            r#"|youtu\.be/)"#
        )
    };
}

/// Example: "https://youtu.be/dQw4w9WgXcQ?t=42"
const VIDEO_PATTERN: &str = concat!(opt_scheme_www!(), video_paths!(), video_id!());

/// Example: "youtube.com/shorts/dQw4w9WgXcQ", or a single path segment holding an id
const SHORT_PATTERN: &str = concat!(
    opt_scheme_www!(),
    r#"youtube\.com/(?:shorts/)?"#,
    video_id!(),
    r#"(?:[?&#/]|$)"#
);

/// Example: "https://www.youtube.com/playlist?feature=share&list=PLMC9KNkIncKtPzgY"
const PLAYLIST_PATTERN: &str = concat!(
    opt_scheme_www!(),
    r#"youtube\.com/playlist\?(?:[^#\s]*&)?list=(?P<id>[A-Za-z0-9_-]+)"#
);

const BARE_ID_PATTERN: &str = r#"^[A-Za-z0-9_-]{11}$"#;

struct Patterns {
    video: Regex,
    short: Regex,
    playlist: Regex,
    bare_id: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        video: Regex::new(VIDEO_PATTERN).unwrap(),
        short: Regex::new(SHORT_PATTERN).unwrap(),
        playlist: Regex::new(PLAYLIST_PATTERN).unwrap(),
        bare_id: Regex::new(BARE_ID_PATTERN).unwrap(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Video,
    Short,
    Playlist,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    /// The input, or the canonical watch URL when a bare id was given
    pub url: String,
    /// Video id for videos and shorts, list id for playlists
    pub id: Option<String>,
}

impl Link {
    /// Turn an unknown link into [`Error::InvalidLink`]
    pub fn known(self) -> Result<Self> {
        match self.kind {
            LinkKind::Unknown => Err(Error::InvalidLink(self.url)),
            _ => Ok(self),
        }
    }
}

/// Whether the input is usable as is as a video id
pub fn is_bare_id(input: &str) -> bool {
    patterns().bare_id.is_match(input)
}

/// Classify the input as a video, short or playlist link.
///
/// Patterns are tested in the order video, short, playlist so that a link
/// matching several of them is always reported with the strictest kind.
/// Characters after the id are tolerated.
pub fn classify(input: &str) -> Link {
    let input = input.trim();
    let url = if is_bare_id(input) {
        VideoRef::watch_url(input)
    } else {
        input.to_owned()
    };

    let patterns = patterns();
    let found = [
        (LinkKind::Video, &patterns.video),
        (LinkKind::Short, &patterns.short),
        (LinkKind::Playlist, &patterns.playlist),
    ]
    .into_iter()
    .find_map(|(kind, re)| re.captures(&url).map(|cap| (kind, cap["id"].to_owned())));

    match found {
        Some((kind, id)) => Link {
            kind,
            url,
            id: Some(id),
        },
        None => Link {
            kind: LinkKind::Unknown,
            url,
            id: None,
        },
    }
}
