use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};

use super::extractor::{ListingExtractor, ListingPage};
use crate::api::{ListingItem, ListingSource, Notifier};
use crate::core::config::ScannerConfig;
use crate::monitoring::PostedRegistry;

/// Outcome of one fetch/extract/notify cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub extracted: usize,
    pub already_posted: usize,
    pub outside_window: usize,
    pub notified: usize,
    pub failed: usize,
}

pub struct NewListingDetector<S, N> {
    source: S,
    notifier: N,
    registry: PostedRegistry,
    extractor: ListingExtractor,
    time_window: chrono::Duration,
    poll_interval: std::time::Duration,
}

impl<S: ListingSource, N: Notifier> NewListingDetector<S, N> {
    pub fn new(
        source: S,
        notifier: N,
        registry: PostedRegistry,
        config: &ScannerConfig,
    ) -> Result<Self> {
        Ok(Self {
            source,
            notifier,
            registry,
            extractor: ListingExtractor::new()?,
            time_window: config.time_window(),
            poll_interval: config.poll_interval(),
        })
    }

    /// Polls forever. Cycles never overlap and the sleep starts once the
    /// previous cycle is done. Errors are logged; none of them stop the loop.
    pub async fn run(&mut self) {
        tracing::info!(
            "New listing detector starting (window {} min, interval {}s, {} already posted in {})",
            self.time_window.num_minutes(),
            self.poll_interval.as_secs(),
            self.registry.len(),
            self.registry.path().display()
        );

        loop {
            let now = Local::now().naive_local();

            match self.poll_once(now).await {
                Ok(report) => tracing::info!(
                    "Cycle done: {} extracted, {} already posted, {} too old, {} notified, {} failed",
                    report.extracted,
                    report.already_posted,
                    report.outside_window,
                    report.notified,
                    report.failed
                ),
                Err(e) => tracing::error!("Polling cycle failed: {:#}", e),
            }

            tracing::info!("Sleeping for {}s.", self.poll_interval.as_secs());
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Runs a single cycle as of `now`.
    ///
    /// A failed fetch counts as an empty page. Each new item is recorded
    /// before it is sent; if recording fails the cycle stops with an error
    /// and the item is not sent.
    pub async fn poll_once(&mut self, now: NaiveDateTime) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        let markup = match self.source.fetch_page().await {
            Ok(markup) => markup,
            Err(e) => {
                tracing::error!("Error fetching items: {:#}", e);
                return Ok(report);
            }
        };

        let fresh = self.select_fresh(&markup, now, &mut report);

        for item in fresh {
            let newly_recorded = self
                .registry
                .record(item.url())
                .with_context(|| format!("Failed to record {} as posted", item.url()))?;
            if !newly_recorded {
                // Same url twice on one page.
                report.already_posted += 1;
                continue;
            }

            tracing::info!("Processing item: {}", item.title());
            if self.notifier.notify(&item).await {
                report.notified += 1;
            } else {
                report.failed += 1;
            }
        }

        Ok(report)
    }

    // The parsed document is not Send, so it is dropped before any await.
    fn select_fresh(
        &self,
        markup: &str,
        now: NaiveDateTime,
        report: &mut CycleReport,
    ) -> Vec<ListingItem> {
        let page = ListingPage::parse(markup);
        let cutoff = now - self.time_window;
        let mut fresh = Vec::new();

        for item in self.extractor.items(&page, now) {
            report.extracted += 1;

            if self.registry.contains(item.url()) {
                report.already_posted += 1;
                continue;
            }
            if item.posted_at() <= cutoff {
                tracing::debug!("{} posted at {} is outside the window", item.url(), item.posted_at());
                report.outside_window += 1;
                continue;
            }

            fresh.push(item);
        }

        fresh
    }

    pub fn registry(&self) -> &PostedRegistry {
        &self.registry
    }
}
