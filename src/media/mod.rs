//! Media module for item representation, post classification and parsing.

pub mod item;
pub mod parser;
pub mod post;

pub use item::{MediaItem, MediaKind};
pub use parser::parse_media_info;
pub use post::{Post, PostLayout};
