//! Filesystem module.
//!
//! Provides:
//! - Destination paths of the output tree
//! - Staging and moving downloaded media into place
//! - Post id validation for file and folder names

pub mod naming;
pub mod organizer;
pub mod paths;

pub use naming::{post_id_from_filename, sanitize_post_id};
pub use organizer::{Organizer, StagedItem};
pub use paths::OutputLayout;
