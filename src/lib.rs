//! Instagram Downloader - batch downloader for Instagram posts.
//!
//! Reads post URLs or shortcodes from a text file, resolves each post through
//! Instagram's media info endpoint and files the media into a categorized
//! tree:
//!
//! - `individual_images/<id>.<ext>` for single-image posts
//! - `individual_videos/<id>.<ext>` for single-video posts
//! - `albums/<id>/<n>.<ext>` for carousels
//!
//! Completed posts are recorded in an append-only ledger so re-runs skip them.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use instagram_downloader::{
//!     Config, DownloadLedger, InstagramApi, Organizer, RunContext, Runner, SessionConfig,
//!     UrlSource,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default(Path::new("config.toml"))?;
//!     let source = UrlSource::open(&config.input.file)?;
//!     let session = SessionConfig::build(&config.network);
//!
//!     let organizer = Organizer::new(&config.output.directory);
//!     organizer.prepare().await?;
//!
//!     let ctx = RunContext {
//!         fetcher: InstagramApi::new(&session)?,
//!         organizer,
//!         ledger: DownloadLedger::open(config.ledger_file())?,
//!         delay: config.delay(),
//!     };
//!     let stats = Runner::new(ctx).run(&source).await?;
//!     println!("saved {} posts", stats.saved);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod download;
pub mod error;
pub mod fs;
pub mod logging;
pub mod media;
pub mod output;
pub mod source;

// Re-exports for convenience
pub use api::{InstagramApi, PostFetcher, SessionConfig};
pub use config::Config;
pub use dedup::DownloadLedger;
pub use download::{bootstrap, PostOutcome, RunContext, RunStats, Runner, Startup};
pub use error::{Error, Result};
pub use fs::Organizer;
pub use media::{MediaItem, MediaKind, Post, PostLayout};
pub use source::{PostReference, UrlSource};
