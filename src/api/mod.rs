//! Instagram API module.
//!
//! This module provides:
//! - Session configuration (cookies, proxy, TLS) and the proxy probe
//! - HTTP client for the media info endpoint
//! - Shortcode decoding
//! - API response types
//! - The [`PostFetcher`] seam the runner downloads through

pub mod client;
pub mod session;
pub mod shortcode;
pub mod types;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::media::{MediaItem, Post};
use crate::source::PostReference;

pub use client::InstagramApi;
pub use session::{load_cookies, probe_proxy, CookieSet, SessionConfig};

/// Resolves post references and materializes their media.
#[async_trait]
pub trait PostFetcher: Send + Sync {
    /// Resolve a reference to a classified post.
    async fn resolve(&self, reference: &PostReference) -> Result<Post>;

    /// Write one media item to `dest`, returning the number of bytes written.
    async fn download(&self, item: &MediaItem, dest: &Path) -> Result<u64>;
}
