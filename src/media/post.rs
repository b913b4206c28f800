//! Resolved posts.

use std::fmt;

use crate::error::{Error, Result};
use crate::media::item::{MediaItem, MediaKind};
use crate::source::PostReference;

/// Shape of a post, decided once when the post is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostLayout {
    SingleImage(MediaItem),
    SingleVideo(MediaItem),
    Album(Vec<MediaItem>),
}

impl PostLayout {
    /// Classify an ordered list of media items.
    ///
    /// One item is a single image or video depending on its kind; more than
    /// one is always an album. An empty list has nothing to download.
    pub fn classify(mut items: Vec<MediaItem>) -> Option<Self> {
        match items.len() {
            0 => None,
            1 => {
                let item = items.remove(0);
                Some(match item.kind {
                    MediaKind::Image => PostLayout::SingleImage(item),
                    MediaKind::Video => PostLayout::SingleVideo(item),
                })
            }
            _ => Some(PostLayout::Album(items)),
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        match self {
            PostLayout::SingleImage(item) | PostLayout::SingleVideo(item) => {
                std::slice::from_ref(item)
            }
            PostLayout::Album(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl fmt::Display for PostLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostLayout::SingleImage(_) => write!(f, "single image"),
            PostLayout::SingleVideo(_) => write!(f, "single video"),
            PostLayout::Album(items) => write!(f, "album of {}", items.len()),
        }
    }
}

/// A post reference together with its resolved media.
#[derive(Debug, Clone)]
pub struct Post {
    pub reference: PostReference,

    /// Stable identifier, used for the ledger and album folder name.
    pub shortcode: String,

    /// Owner username, when the API reports it.
    pub owner: Option<String>,

    pub layout: PostLayout,
}

impl Post {
    /// Build a post from its media items, numbering them in order.
    pub fn new(
        reference: PostReference,
        shortcode: impl Into<String>,
        owner: Option<String>,
        mut items: Vec<MediaItem>,
    ) -> Result<Self> {
        let shortcode = shortcode.into();

        for (index, item) in items.iter_mut().enumerate() {
            item.ordinal = index + 1;
        }

        let layout = PostLayout::classify(items)
            .ok_or_else(|| Error::NotFound(format!("{} has no downloadable media", shortcode)))?;

        Ok(Self {
            reference,
            shortcode,
            owner,
            layout,
        })
    }

    pub fn items(&self) -> &[MediaItem] {
        self.layout.items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str) -> MediaItem {
        MediaItem::new(MediaKind::Image, url, "jpg", 0)
    }

    fn video(url: &str) -> MediaItem {
        MediaItem::new(MediaKind::Video, url, "mp4", 0)
    }

    #[test]
    fn test_single_item_is_never_an_album() {
        assert!(matches!(
            PostLayout::classify(vec![image("a")]),
            Some(PostLayout::SingleImage(_))
        ));
        assert!(matches!(
            PostLayout::classify(vec![video("a")]),
            Some(PostLayout::SingleVideo(_))
        ));
    }

    #[test]
    fn test_multiple_items_are_always_an_album() {
        let layout = PostLayout::classify(vec![image("a"), image("b")]).unwrap();
        assert!(matches!(layout, PostLayout::Album(ref items) if items.len() == 2));

        let mixed = PostLayout::classify(vec![image("a"), video("b"), image("c")]).unwrap();
        assert!(matches!(mixed, PostLayout::Album(ref items) if items.len() == 3));
    }

    #[test]
    fn test_empty_post_has_no_layout() {
        assert!(PostLayout::classify(Vec::new()).is_none());

        let err = Post::new(PostReference::new("ABC123", 1), "ABC123", None, Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_post_numbers_items_from_one() {
        let post = Post::new(
            PostReference::new("XYZ789", 1),
            "XYZ789",
            None,
            vec![image("a"), image("b"), video("c")],
        )
        .unwrap();

        let ordinals: Vec<usize> = post.items().iter().map(|i| i.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(post.items()[2].ordinal_filename(), "3.mp4");
    }
}
