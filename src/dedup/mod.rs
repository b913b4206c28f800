//! Deduplication module.
//!
//! Tracks which posts were already downloaded, across runs, through an
//! append-only ledger file.

pub mod ledger;

pub use ledger::DownloadLedger;
