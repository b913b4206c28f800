//! The batch loop: one reference at a time, in file order.

use std::time::Duration;

use tokio::time::sleep;

use crate::api::shortcode::shortcode_to_media_id;
use crate::api::PostFetcher;
use crate::dedup::DownloadLedger;
use crate::download::state::{PostOutcome, RunStats};
use crate::error::{Error, Result};
use crate::fs::{Organizer, StagedItem};
use crate::source::{PostReference, UrlSource};

/// Everything a run needs, built once at startup.
pub struct RunContext<F: PostFetcher> {
    pub fetcher: F,
    pub organizer: Organizer,
    pub ledger: DownloadLedger,
    /// Pause between two posts that touch the network.
    pub delay: Duration,
}

/// Drives every reference through
/// `Pending -> (SkippedDuplicate | Fetching) -> (Saved | Failed)`.
pub struct Runner<F: PostFetcher> {
    ctx: RunContext<F>,
    fetched_before: bool,
}

impl<F: PostFetcher> Runner<F> {
    pub fn new(ctx: RunContext<F>) -> Self {
        Self {
            ctx,
            fetched_before: false,
        }
    }

    /// Process the whole source and close the ledger.
    ///
    /// Per-post failures are counted, not returned. Only failures reading the
    /// input or closing the ledger abort the run.
    pub async fn run(mut self, source: &UrlSource) -> Result<RunStats> {
        let total = source.count()?;
        let mut stats = RunStats::default();

        tracing::info!(
            "Processing {} references from {}",
            total,
            source.path().display()
        );

        for (index, reference) in source.references()?.enumerate() {
            let reference = reference?;
            let position = index + 1;

            tracing::info!("[{}/{}] {}", position, total, reference);

            let outcome = self.process(&reference).await;
            report(position, total, &reference, &outcome);
            stats.record(&outcome);
        }

        if let Err(e) = self.ctx.organizer.cleanup().await {
            tracing::debug!("Could not remove staging area: {}", e);
        }
        self.ctx.ledger.close()?;

        Ok(stats)
    }

    async fn process(&mut self, reference: &PostReference) -> PostOutcome {
        // Invalid references never reach the network or the delay
        let shortcode = match reference.shortcode() {
            Ok(code) => code,
            Err(e) => return PostOutcome::Failed(e),
        };

        if self.ctx.ledger.has(&shortcode) {
            return PostOutcome::SkippedDuplicate;
        }

        if let Err(e) = shortcode_to_media_id(&shortcode) {
            return PostOutcome::Failed(e);
        }

        if self.fetched_before && !self.ctx.delay.is_zero() {
            tracing::debug!("Waiting {:?} before next fetch", self.ctx.delay);
            sleep(self.ctx.delay).await;
        }
        self.fetched_before = true;

        match self.fetch(reference, &shortcode).await {
            Ok(files) => PostOutcome::Saved { files },
            Err(e) => PostOutcome::Failed(e),
        }
    }

    async fn fetch(&mut self, reference: &PostReference, shortcode: &str) -> Result<usize> {
        let post = self.ctx.fetcher.resolve(reference).await?;
        tracing::debug!(
            "Resolved {} as {}{}",
            post.shortcode,
            post.layout,
            post.owner
                .as_deref()
                .map(|owner| format!(" by @{}", owner))
                .unwrap_or_default()
        );

        let staged = self.ctx.organizer.stage(&post).await?;

        if let Err(e) = self.download_all(&staged).await {
            if let Err(cleanup) = self.ctx.organizer.discard(&post).await {
                tracing::debug!("Could not discard staging for {}: {}", shortcode, cleanup);
            }
            return Err(e);
        }

        let files = self.ctx.organizer.commit(&post, &staged).await?;
        self.ctx.ledger.record(shortcode)?;
        Ok(files)
    }

    async fn download_all(&self, staged: &[StagedItem]) -> Result<()> {
        for entry in staged {
            let bytes = self.ctx.fetcher.download(&entry.item, &entry.staged).await?;
            tracing::debug!(
                "Downloaded {} {} ({} bytes)",
                entry.item.kind,
                entry.item.ordinal,
                bytes
            );
        }
        Ok(())
    }
}

fn report(position: usize, total: usize, reference: &PostReference, outcome: &PostOutcome) {
    match outcome {
        PostOutcome::SkippedDuplicate => {
            tracing::info!("[{}/{}] Already downloaded, skipping", position, total);
        }
        PostOutcome::Saved { files } => {
            tracing::info!(
                "[{}/{}] Saved {} file{}",
                position,
                total,
                files,
                if *files == 1 { "" } else { "s" }
            );
        }
        PostOutcome::Failed(e @ Error::RateLimited(_)) => {
            tracing::warn!(
                "[{}/{}] {} ({}): {}; not retrying",
                position,
                total,
                reference,
                e.kind(),
                e
            );
        }
        PostOutcome::Failed(e) => {
            tracing::error!(
                "[{}/{}] {} ({}): {}",
                position,
                total,
                reference,
                e.kind(),
                e
            );
        }
    }
}
