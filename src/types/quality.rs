use std::{fmt::Display, str::FromStr};

/// Whether the user wants the sound only or the muxed audio+video file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

/// The quality a download is made at.
///
/// Resolved once per playlist and reused for every following entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityChoice {
    /// A resolution string such as "720p"
    Resolution(String),
    Audio,
}

impl QualityChoice {
    pub fn kind(&self) -> MediaKind {
        match self {
            QualityChoice::Resolution(_) => MediaKind::Video,
            QualityChoice::Audio => MediaKind::Audio,
        }
    }
}

impl FromStr for QualityChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "audio" {
            return Ok(Self::Audio);
        }

        let digits = s.strip_suffix('p').unwrap_or(&s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self::Resolution(format!("{digits}p")))
        } else {
            Err(format!("'{s}' is neither 'audio' nor a resolution like '720p'"))
        }
    }
}

impl Display for QualityChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityChoice::Resolution(res) => write!(f, "{res}"),
            QualityChoice::Audio => write!(f, "audio"),
        }
    }
}
