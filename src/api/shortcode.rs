//! Shortcode to media id conversion.
//!
//! A shortcode is the numeric media id written in a URL-safe base64
//! alphabet, most significant digit first.

use crate::error::{Error, Result};

const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Longest shortcode that maps to a public media id. Longer codes belong to
/// private share links and cannot be decoded.
const MAX_SHORTCODE_LEN: usize = 11;

/// Decode a shortcode into the numeric media id used by the API.
pub fn shortcode_to_media_id(shortcode: &str) -> Result<u64> {
    let invalid = |reason: &str| Error::NotFound(format!("{} ({})", shortcode, reason));

    if shortcode.is_empty() {
        return Err(invalid("empty shortcode"));
    }

    if shortcode.len() > MAX_SHORTCODE_LEN {
        return Err(invalid("shortcode too long, private links are not supported"));
    }

    let mut value: u64 = 0;
    for ch in shortcode.chars() {
        let index = ALPHABET
            .find(ch)
            .ok_or_else(|| invalid("invalid character"))? as u64;
        value = value
            .checked_mul(64)
            .and_then(|v| v.checked_add(index))
            .ok_or_else(|| invalid("media id overflow"))?;
    }

    Ok(value)
}
