//! API response type definitions.

use serde::Deserialize;

/// `media_type` value of a photo.
pub const MEDIA_TYPE_IMAGE: i32 = 1;

/// `media_type` value of a video or reel.
pub const MEDIA_TYPE_VIDEO: i32 = 2;

/// `media_type` value of a carousel (album).
pub const MEDIA_TYPE_CAROUSEL: i32 = 8;

/// Response of `/api/v1/media/<id>/info/`.
///
/// Error responses share the envelope: `{"message": "...", "status": "fail"}`.
#[derive(Debug, Default, Deserialize)]
pub struct MediaInfoResponse {
    #[serde(default)]
    pub items: Vec<ApiMedia>,

    pub status: Option<String>,

    pub message: Option<String>,

    #[serde(default)]
    pub require_login: bool,
}

impl MediaInfoResponse {
    /// Whether the body reports that a logged-in session is needed.
    pub fn requires_login(&self) -> bool {
        self.require_login
            || self
                .message
                .as_deref()
                .map(|m| m.contains("login_required"))
                .unwrap_or(false)
    }

    /// Whether the body carries Instagram's throttling message.
    pub fn is_throttled(&self) -> bool {
        self.message
            .as_deref()
            .map(|m| {
                let m = m.to_lowercase();
                m.contains("wait a few minutes") || m.contains("rate limit")
            })
            .unwrap_or(false)
    }
}

/// A media node: a whole post, or one carousel child.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMedia {
    pub media_type: i32,

    /// Shortcode of the post (top-level nodes only).
    pub code: Option<String>,

    pub user: Option<ApiUser>,

    pub image_versions2: Option<ImageVersions>,

    #[serde(default)]
    pub video_versions: Vec<MediaCandidate>,

    #[serde(default)]
    pub carousel_media: Vec<ApiMedia>,
}

/// Post owner.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub username: String,
}

/// Available image renditions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageVersions {
    #[serde(default)]
    pub candidates: Vec<MediaCandidate>,
}

/// One rendition of an image or video.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaCandidate {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl MediaCandidate {
    pub fn resolution(&self) -> u64 {
        (self.width.unwrap_or(0) as u64) * (self.height.unwrap_or(0) as u64)
    }
}
