//! Filename validation.

use crate::error::{Error, Result};

/// Validate a post id before it is used as a file or folder name.
///
/// Returns an error if the id contains path traversal patterns, separators or
/// characters that are not valid in filenames.
pub fn sanitize_post_id(id: &str) -> Result<&str> {
    // Reject path traversal attempts
    if id.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            id
        )));
    }

    if id.contains('/') || id.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in post id: '{}'",
            id
        )));
    }

    if id
        .chars()
        .any(|c| c.is_control() || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|'))
    {
        return Err(Error::InvalidFilename(format!(
            "Invalid characters in post id: '{}'",
            id
        )));
    }

    // Reject empty or whitespace-only names
    if id.trim().is_empty() || id.starts_with('.') {
        return Err(Error::InvalidFilename(
            "Post id cannot be empty or start with a dot".to_string(),
        ));
    }

    Ok(id)
}

/// Split `ABC123.jpg` into the post id `ABC123`.
pub fn post_id_from_filename(filename: &str) -> Option<&str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(stem)
}
