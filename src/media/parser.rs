//! Media parsing utilities.

use crate::api::types::{
    ApiMedia, MediaCandidate, MediaInfoResponse, MEDIA_TYPE_CAROUSEL, MEDIA_TYPE_IMAGE,
    MEDIA_TYPE_VIDEO,
};
use crate::error::{Error, Result};
use crate::media::item::{MediaItem, MediaKind};
use crate::media::post::Post;
use crate::source::PostReference;

/// Turn a media-info response into a classified [`Post`].
pub fn parse_media_info(
    reference: &PostReference,
    shortcode: &str,
    response: MediaInfoResponse,
) -> Result<Post> {
    let media = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(shortcode.to_string()))?;

    let owner = media.user.as_ref().map(|u| u.username.clone());
    let items = collect_items(&media);

    if items.is_empty() {
        return Err(Error::Fetch(format!(
            "{}: no downloadable media in response (media_type {})",
            shortcode, media.media_type
        )));
    }

    Post::new(reference.clone(), shortcode, owner, items)
}

/// Flatten a post node into its ordered media items.
fn collect_items(media: &ApiMedia) -> Vec<MediaItem> {
    if media.media_type == MEDIA_TYPE_CAROUSEL {
        return media.carousel_media.iter().filter_map(parse_node).collect();
    }

    parse_node(media).into_iter().collect()
}

/// Parse a single image or video node.
fn parse_node(node: &ApiMedia) -> Option<MediaItem> {
    let (kind, candidate) = match node.media_type {
        MEDIA_TYPE_VIDEO => (MediaKind::Video, select_best_candidate(&node.video_versions)?),
        MEDIA_TYPE_IMAGE => (MediaKind::Image, select_image(node)?),
        // Unknown types: prefer a video rendition, fall back to the image.
        _ => match select_best_candidate(&node.video_versions) {
            Some(candidate) => (MediaKind::Video, candidate),
            None => (MediaKind::Image, select_image(node)?),
        },
    };

    let extension = extract_extension(&candidate.url, kind);

    Some(MediaItem {
        kind,
        url: candidate.url.clone(),
        extension,
        ordinal: 0,
    })
}

fn select_image(node: &ApiMedia) -> Option<&MediaCandidate> {
    node.image_versions2
        .as_ref()
        .and_then(|versions| select_best_candidate(&versions.candidates))
}

/// Select the highest resolution rendition with a non-empty URL.
fn select_best_candidate(candidates: &[MediaCandidate]) -> Option<&MediaCandidate> {
    let mut best: Option<&MediaCandidate> = None;

    for candidate in candidates {
        if candidate.url.trim().is_empty() {
            continue;
        }

        match best {
            Some(current) if current.resolution() >= candidate.resolution() => {}
            _ => best = Some(candidate),
        }
    }

    best
}

/// Extract the file extension from the URL, falling back to the media kind.
fn extract_extension(url: &str, kind: MediaKind) -> String {
    extract_extension_from_url(url)
        .filter(|ext| is_media_extension(ext, kind))
        .unwrap_or_else(|| kind.default_extension().to_string())
}

/// Extract extension from URL path.
fn extract_extension_from_url(url: &str) -> Option<String> {
    // Remove query string
    let path = url.split('?').next()?;

    // Get the last segment
    let filename = path.rsplit('/').next()?;
    if !filename.contains('.') {
        return None;
    }

    // Get extension
    let ext = filename.rsplit('.').next()?;

    // Validate it looks like an extension (1-10 chars, alphanumeric)
    if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_lowercase())
    } else {
        None
    }
}

/// Whether the extension's MIME type matches the media kind.
fn is_media_extension(ext: &str, kind: MediaKind) -> bool {
    let top_level = match kind {
        MediaKind::Image => mime_guess::mime::IMAGE,
        MediaKind::Video => mime_guess::mime::VIDEO,
    };

    mime_guess::from_ext(ext)
        .iter()
        .any(|mime| mime.type_() == top_level)
}
