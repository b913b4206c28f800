//! Destination paths of the categorized output tree.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::sanitize_post_id;
use crate::media::{MediaItem, Post, PostLayout};

pub const IMAGES_DIR: &str = "individual_images";
pub const VIDEOS_DIR: &str = "individual_videos";
pub const ALBUMS_DIR: &str = "albums";

/// Staging area for in-flight downloads, inside the output root so the final
/// move is a rename on the same filesystem.
pub const STAGING_DIR: &str = ".staging";

/// Layout of the output tree rooted at one directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join(VIDEOS_DIR)
    }

    pub fn albums_dir(&self) -> PathBuf {
        self.root.join(ALBUMS_DIR)
    }

    /// The three category directories.
    pub fn category_dirs(&self) -> [PathBuf; 3] {
        [self.images_dir(), self.videos_dir(), self.albums_dir()]
    }

    /// Per-post staging directory.
    pub fn staging_dir(&self, post_id: &str) -> Result<PathBuf> {
        Ok(self.root.join(STAGING_DIR).join(sanitize_post_id(post_id)?))
    }

    /// Destination of every media item of a post.
    ///
    /// - single image: `individual_images/<id>.<ext>`
    /// - single video: `individual_videos/<id>.<ext>`
    /// - album: `albums/<id>/<ordinal>.<ext>`
    pub fn destinations<'a>(&self, post: &'a Post) -> Result<Vec<(&'a MediaItem, PathBuf)>> {
        let id = sanitize_post_id(&post.shortcode)?;

        let destinations = match &post.layout {
            PostLayout::SingleImage(item) => {
                vec![(item, self.images_dir().join(single_filename(id, item)))]
            }
            PostLayout::SingleVideo(item) => {
                vec![(item, self.videos_dir().join(single_filename(id, item)))]
            }
            PostLayout::Album(items) => {
                let album_dir = self.albums_dir().join(id);
                items
                    .iter()
                    .map(|item| (item, album_dir.join(item.ordinal_filename())))
                    .collect()
            }
        };

        Ok(destinations)
    }
}

fn single_filename(id: &str, item: &MediaItem) -> String {
    format!("{}.{}", id, item.extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use crate::source::PostReference;

    fn post(id: &str, items: Vec<MediaItem>) -> Post {
        Post::new(PostReference::new(id, 1), id, None, items).unwrap()
    }

    fn image() -> MediaItem {
        MediaItem::new(MediaKind::Image, "https://cdn.example.com/a.jpg", "jpg", 0)
    }

    fn video() -> MediaItem {
        MediaItem::new(MediaKind::Video, "https://cdn.example.com/a.mp4", "mp4", 0)
    }

    #[test]
    fn test_single_image_destination() {
        let layout = OutputLayout::new("/downloads");
        let post = post("ABC123", vec![image()]);

        let dest = layout.destinations(&post).unwrap();
        assert_eq!(dest.len(), 1);
        assert_eq!(
            dest[0].1,
            PathBuf::from("/downloads/individual_images/ABC123.jpg")
        );
    }

    #[test]
    fn test_single_video_destination() {
        let layout = OutputLayout::new("/downloads");
        let post = post("VID1", vec![video()]);

        let dest = layout.destinations(&post).unwrap();
        assert_eq!(
            dest[0].1,
            PathBuf::from("/downloads/individual_videos/VID1.mp4")
        );
    }

    #[test]
    fn test_album_destinations_share_one_folder() {
        let layout = OutputLayout::new("/downloads");
        let post = post("XYZ789", vec![image(), image(), video()]);

        let dest: Vec<PathBuf> = layout
            .destinations(&post)
            .unwrap()
            .into_iter()
            .map(|(_, path)| path)
            .collect();

        assert_eq!(
            dest,
            vec![
                PathBuf::from("/downloads/albums/XYZ789/1.jpg"),
                PathBuf::from("/downloads/albums/XYZ789/2.jpg"),
                PathBuf::from("/downloads/albums/XYZ789/3.mp4"),
            ]
        );
    }

    #[test]
    fn test_single_items_never_land_in_albums() {
        let layout = OutputLayout::new("/downloads");
        for item in [image(), video()] {
            let post = post("ONE", vec![item]);
            for (_, path) in layout.destinations(&post).unwrap() {
                assert!(!path.starts_with(layout.albums_dir()));
            }
        }
    }

    #[test]
    fn test_rejects_unsafe_post_id() {
        let layout = OutputLayout::new("/downloads");
        let post = post("../escape", vec![image()]);
        assert!(layout.destinations(&post).is_err());
        assert!(layout.staging_dir("../escape").is_err());
    }
}
