//! URL source: the input file of post references.
//!
//! One URL or shortcode per line. Lines are trimmed; blank lines and `#`
//! comments are skipped. The file is re-opened on every pass, so the sequence
//! can be restarted.

pub mod reference;

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub use reference::PostReference;

/// Handle to the input file of post references.
#[derive(Debug, Clone)]
pub struct UrlSource {
    path: PathBuf,
}

impl UrlSource {
    /// Open the input file.
    ///
    /// Fails with [`Error::InputFile`] when the path is missing or is not a
    /// regular file. This is fatal for the run.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::InputFile(path));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazily iterate the references in file order.
    pub fn references(&self) -> Result<References> {
        let file = File::open(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::InputFile(self.path.clone())
            } else {
                Error::Io(e)
            }
        })?;

        Ok(References {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Count the references without keeping them in memory.
    pub fn count(&self) -> Result<usize> {
        let mut total = 0;
        for reference in self.references()? {
            reference?;
            total += 1;
        }
        Ok(total)
    }
}

/// Iterator over the references of a [`UrlSource`].
pub struct References {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl Iterator for References {
    type Item = Result<PostReference>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(Error::Io(e))),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return Some(Ok(PostReference::new(trimmed, self.line_no)));
        }
    }
}
