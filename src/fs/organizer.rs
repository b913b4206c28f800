//! Organizer: stages downloads and moves them into the output tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::Result;
use crate::fs::naming::post_id_from_filename;
use crate::fs::paths::{OutputLayout, STAGING_DIR};
use crate::media::{MediaItem, Post};

/// One media item staged for a post, and where it goes afterwards.
#[derive(Debug, Clone)]
pub struct StagedItem {
    pub item: MediaItem,
    pub staged: PathBuf,
    pub destination: PathBuf,
}

/// Writes resolved posts into the categorized output tree.
#[derive(Debug, Clone)]
pub struct Organizer {
    layout: OutputLayout,
}

impl Organizer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: OutputLayout::new(root),
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Create the root and category directories. Safe to call repeatedly.
    pub async fn prepare(&self) -> Result<()> {
        for dir in self.layout.category_dirs() {
            fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Create an empty staging directory for the post and plan every item.
    ///
    /// Leftovers of an interrupted earlier attempt are removed first.
    pub async fn stage(&self, post: &Post) -> Result<Vec<StagedItem>> {
        let staging = self.layout.staging_dir(&post.shortcode)?;
        remove_dir_if_exists(&staging).await?;
        fs::create_dir_all(&staging).await?;

        let planned = self
            .layout
            .destinations(post)?
            .into_iter()
            .map(|(item, destination)| StagedItem {
                staged: staging.join(item.ordinal_filename()),
                item: item.clone(),
                destination,
            })
            .collect();

        Ok(planned)
    }

    /// Move staged files to their destinations and drop the staging directory.
    ///
    /// Existing destination files are replaced.
    pub async fn commit(&self, post: &Post, staged: &[StagedItem]) -> Result<usize> {
        for entry in staged {
            if let Some(parent) = entry.destination.parent() {
                fs::create_dir_all(parent).await?;
            }

            if fs::try_exists(&entry.destination).await? {
                tracing::debug!("Overwriting {}", entry.destination.display());
                fs::remove_file(&entry.destination).await?;
            }

            fs::rename(&entry.staged, &entry.destination).await?;
            tracing::debug!("Saved {}", entry.destination.display());
        }

        self.discard(post).await?;
        Ok(staged.len())
    }

    /// Remove the staging directory of a post.
    pub async fn discard(&self, post: &Post) -> Result<()> {
        let staging = self.layout.staging_dir(&post.shortcode)?;
        remove_dir_if_exists(&staging).await
    }

    /// Remove the whole staging area if it is empty or left over.
    pub async fn cleanup(&self) -> Result<()> {
        remove_dir_if_exists(&self.layout.root().join(STAGING_DIR)).await
    }

    /// Collect the ids of posts already present in the output tree.
    ///
    /// Album folders and single files named `<id>.<ext>` count as downloaded.
    pub fn scan_existing(&self) -> Result<HashSet<String>> {
        let mut ids = HashSet::new();

        let albums = self.layout.albums_dir();
        if albums.is_dir() {
            for entry in std::fs::read_dir(&albums)? {
                let entry = entry?;
                if entry.path().is_dir() {
                    if let Some(name) = entry.file_name().to_str() {
                        ids.insert(name.to_string());
                    }
                }
            }
        }

        for dir in [self.layout.images_dir(), self.layout.videos_dir()] {
            if !dir.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                if !entry.path().is_file() {
                    continue;
                }
                if let Some(id) = entry.file_name().to_str().and_then(post_id_from_filename) {
                    ids.insert(id.to_string());
                }
            }
        }

        Ok(ids)
    }
}

async fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use crate::source::PostReference;

    fn post(id: &str, kinds: &[MediaKind]) -> Post {
        let items = kinds
            .iter()
            .map(|kind| {
                MediaItem::new(
                    *kind,
                    "https://cdn.example.com/x",
                    kind.default_extension(),
                    0,
                )
            })
            .collect();
        Post::new(PostReference::new(id, 1), id, None, items).unwrap()
    }

    async fn write_staged(staged: &[StagedItem], content: &[u8]) {
        for entry in staged {
            fs::write(&entry.staged, content).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_prepare_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let organizer = Organizer::new(dir.path().join("out"));

        organizer.prepare().await.unwrap();
        organizer.prepare().await.unwrap();

        for category in organizer.layout().category_dirs() {
            assert!(category.is_dir());
        }
    }

    #[tokio::test]
    async fn test_commit_single_image() {
        let dir = tempfile::tempdir().unwrap();
        let organizer = Organizer::new(dir.path());
        organizer.prepare().await.unwrap();

        let post = post("ABC123", &[MediaKind::Image]);
        let staged = organizer.stage(&post).await.unwrap();
        write_staged(&staged, b"jpeg").await;

        assert_eq!(organizer.commit(&post, &staged).await.unwrap(), 1);

        let saved = dir.path().join("individual_images/ABC123.jpg");
        assert_eq!(std::fs::read(saved).unwrap(), b"jpeg");
        assert!(!dir.path().join(STAGING_DIR).join("ABC123").exists());
    }

    #[tokio::test]
    async fn test_commit_album_creates_subfolder() {
        let dir = tempfile::tempdir().unwrap();
        let organizer = Organizer::new(dir.path());

        let post = post(
            "XYZ789",
            &[MediaKind::Image, MediaKind::Image, MediaKind::Video],
        );
        let staged = organizer.stage(&post).await.unwrap();
        write_staged(&staged, b"data").await;
        organizer.commit(&post, &staged).await.unwrap();

        let album = dir.path().join("albums/XYZ789");
        assert!(album.join("1.jpg").is_file());
        assert!(album.join("2.jpg").is_file());
        assert!(album.join("3.mp4").is_file());
    }

    #[tokio::test]
    async fn test_commit_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let organizer = Organizer::new(dir.path());
        organizer.prepare().await.unwrap();

        let existing = dir.path().join("individual_videos/VID1.mp4");
        std::fs::write(&existing, b"old").unwrap();

        let post = post("VID1", &[MediaKind::Video]);
        let staged = organizer.stage(&post).await.unwrap();
        write_staged(&staged, b"new").await;
        organizer.commit(&post, &staged).await.unwrap();

        assert_eq!(std::fs::read(existing).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_stage_clears_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let organizer = Organizer::new(dir.path());

        let post = post("ABC123", &[MediaKind::Image]);
        let leftover = dir.path().join(STAGING_DIR).join("ABC123").join("stale.part");
        std::fs::create_dir_all(leftover.parent().unwrap()).unwrap();
        std::fs::write(&leftover, b"partial").unwrap();

        organizer.stage(&post).await.unwrap();
        assert!(!leftover.exists());

        organizer.discard(&post).await.unwrap();
        organizer.cleanup().await.unwrap();
        assert!(!dir.path().join(STAGING_DIR).exists());
    }

    #[tokio::test]
    async fn test_scan_existing() {
        let dir = tempfile::tempdir().unwrap();
        let organizer = Organizer::new(dir.path());
        organizer.prepare().await.unwrap();

        std::fs::write(dir.path().join("individual_images/ABC123.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("individual_videos/VID1.mp4"), b"x").unwrap();
        std::fs::create_dir_all(dir.path().join("albums/XYZ789")).unwrap();

        let ids = organizer.scan_existing().unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("ABC123"));
        assert!(ids.contains("VID1"));
        assert!(ids.contains("XYZ789"));
    }
}
