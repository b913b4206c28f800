//! Post references and shortcode extraction.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Path segments Instagram uses in front of a post shortcode.
const POST_URL_PATTERN: &str =
    r"(?i)(?:^|[/.])instagram\.com/(?:[A-Za-z0-9._]+/)?(?:p|reel|reels|tv)/([A-Za-z0-9_-]+)";

/// A bare shortcode line.
const SHORTCODE_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

fn post_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(POST_URL_PATTERN).expect("valid post URL pattern"))
}

fn shortcode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SHORTCODE_PATTERN).expect("valid shortcode pattern"))
}

/// One line of the input file identifying a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReference {
    raw: String,
    line: usize,
}

impl PostReference {
    pub fn new(raw: impl Into<String>, line: usize) -> Self {
        Self {
            raw: raw.into(),
            line,
        }
    }

    /// The trimmed text as it appeared in the input file.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 1-based line number in the input file.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Derive the post shortcode without touching the network.
    ///
    /// Accepts `/p/`, `/reel/`, `/reels/` and `/tv/` URLs with or without a
    /// scheme, as well as a bare shortcode.
    pub fn shortcode(&self) -> Result<String> {
        if let Some(captures) = post_url_regex().captures(&self.raw) {
            if let Some(code) = captures.get(1) {
                return Ok(code.as_str().to_string());
            }
        }

        if !self.raw.contains('/') && shortcode_regex().is_match(&self.raw) {
            return Ok(self.raw.clone());
        }

        Err(Error::InvalidReference {
            line: self.line,
            reference: self.raw.clone(),
        })
    }
}

impl fmt::Display for PostReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
