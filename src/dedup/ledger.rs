//! Append-only ledger of successfully downloaded post ids.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Persistent set of completed post ids, one per line.
///
/// The file is only ever appended to. Each new id is flushed as soon as it is
/// recorded so an interrupted run keeps everything completed so far.
#[derive(Debug)]
pub struct DownloadLedger {
    path: PathBuf,
    seen: HashSet<String>,
    file: File,
}

impl DownloadLedger {
    /// Load the ids already in the ledger and open it for appending.
    ///
    /// A missing file (and its parent directories) is created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut seen = HashSet::new();
        let mut unterminated = false;
        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            for line in reader.lines() {
                let line = line?;
                let id = line.trim();
                if !id.is_empty() {
                    seen.insert(id.to_string());
                }
            }
            unterminated = !ends_with_newline(&path)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        // A torn or hand-edited last line must not swallow the next id
        if unterminated {
            file.write_all(b"\n")?;
            file.flush()?;
        }

        tracing::debug!(
            "Opened ledger {} with {} entries",
            path.display(),
            seen.len()
        );

        Ok(Self { path, seen, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Whether `id` has been downloaded before.
    pub fn has(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Record a completed post. Ids already present are not written again.
    pub fn record(&mut self, id: &str) -> Result<bool> {
        if self.seen.contains(id) {
            return Ok(false);
        }

        writeln!(self.file, "{}", id)?;
        self.file.flush()?;
        self.seen.insert(id.to_string());
        Ok(true)
    }

    /// Mark ids as seen for this run without persisting them.
    ///
    /// Returns how many ids were not already known.
    pub fn seed<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        ids.into_iter()
            .filter(|id| self.seen.insert(id.clone()))
            .count()
    }

    /// Flush and sync the ledger to disk.
    pub fn close(mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

fn ends_with_newline(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
