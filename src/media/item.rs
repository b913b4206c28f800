//! Media item representation.

use std::fmt;

/// Type of media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Extension used when the source URL does not carry a usable one.
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// A downloadable media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Image or video.
    pub kind: MediaKind,

    /// Download URL.
    pub url: String,

    /// File extension (without dot).
    pub extension: String,

    /// 1-based position within the parent post.
    pub ordinal: usize,
}

impl MediaItem {
    pub fn new(
        kind: MediaKind,
        url: impl Into<String>,
        extension: impl Into<String>,
        ordinal: usize,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            extension: extension.into(),
            ordinal,
        }
    }

    /// Filename used inside an album folder, e.g. `2.jpg`.
    pub fn ordinal_filename(&self) -> String {
        format!("{}.{}", self.ordinal, self.extension)
    }
}
