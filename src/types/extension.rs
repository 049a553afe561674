/// Containers the downloads end up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Mp3,
    Mp4,
}

impl Extension {
    /// Return the extension with the leading dot.
    /// e.g. ".ext"
    pub fn with_dot(self) -> &'static str {
        match self {
            Extension::Mp3 => ".mp3",
            Extension::Mp4 => ".mp4",
        }
    }

    /// Return the extension without the leading dot.
    /// e.g. "ext"
    pub fn with_no_dot(self) -> &'static str {
        &self.with_dot()[1..]
    }
}
