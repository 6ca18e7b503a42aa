//! Crawl statistics aggregator
//!
//! A single task owns every counter. The other roles report what happened
//! over a channel and never touch shared counters themselves.

use crate::state::ResourceKind;
use std::fmt;
use tokio::sync::mpsc;

/// Something countable that happened in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A fresh address was admitted into a waiting queue
    Admitted(ResourceKind),

    /// A discovered address was already known to the store
    Duplicate(ResourceKind),

    /// The robots gate refused the address
    Denied(ResourceKind),

    /// A fetch/store attempt finished successfully
    Completed(ResourceKind),

    /// A fetch/store attempt failed permanently
    Failed(ResourceKind),
}

/// Aggregated counts for a finished crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_admitted: u64,
    pub images_admitted: u64,
    pub pages_done: u64,
    pub images_done: u64,
    pub pages_failed: u64,
    pub images_failed: u64,
    pub duplicates: u64,
    pub robots_denied: u64,
}

impl CrawlSummary {
    pub fn record(&mut self, event: CrawlEvent) {
        match event {
            CrawlEvent::Admitted(ResourceKind::Page) => self.pages_admitted += 1,
            CrawlEvent::Admitted(ResourceKind::Image) => self.images_admitted += 1,
            CrawlEvent::Completed(ResourceKind::Page) => self.pages_done += 1,
            CrawlEvent::Completed(ResourceKind::Image) => self.images_done += 1,
            CrawlEvent::Failed(ResourceKind::Page) => self.pages_failed += 1,
            CrawlEvent::Failed(ResourceKind::Image) => self.images_failed += 1,
            CrawlEvent::Duplicate(_) => self.duplicates += 1,
            CrawlEvent::Denied(_) => self.robots_denied += 1,
        }
    }

    pub fn total_admitted(&self) -> u64 {
        self.pages_admitted + self.images_admitted
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pages {}/{} done, images {}/{} done, {} failed, {} duplicates, {} robots-denied",
            self.pages_done,
            self.pages_admitted,
            self.images_done,
            self.images_admitted,
            self.pages_failed + self.images_failed,
            self.duplicates,
            self.robots_denied
        )
    }
}

/// Consumes events until every reporting role has exited
///
/// Runs until all event senders are dropped, so it naturally outlives the
/// workers and misses nothing.
pub async fn run_stats(mut events_rx: mpsc::Receiver<CrawlEvent>) -> CrawlSummary {
    let mut summary = CrawlSummary::default();

    while let Some(event) = events_rx.recv().await {
        summary.record(event);

        let admitted = summary.total_admitted();
        if admitted > 0 && admitted % 100 == 0 {
            if let CrawlEvent::Admitted(_) = event {
                tracing::info!("Progress: {}", summary);
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_per_kind() {
        let mut summary = CrawlSummary::default();
        summary.record(CrawlEvent::Admitted(ResourceKind::Page));
        summary.record(CrawlEvent::Admitted(ResourceKind::Image));
        summary.record(CrawlEvent::Completed(ResourceKind::Image));
        summary.record(CrawlEvent::Failed(ResourceKind::Page));
        summary.record(CrawlEvent::Duplicate(ResourceKind::Page));
        summary.record(CrawlEvent::Denied(ResourceKind::Image));

        assert_eq!(summary.pages_admitted, 1);
        assert_eq!(summary.images_admitted, 1);
        assert_eq!(summary.images_done, 1);
        assert_eq!(summary.pages_failed, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.robots_denied, 1);
        assert_eq!(summary.total_admitted(), 2);
    }

    #[tokio::test]
    async fn test_run_stats_drains_until_senders_gone() {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(run_stats(rx));

        tx.send(CrawlEvent::Admitted(ResourceKind::Page))
            .await
            .unwrap();
        tx.send(CrawlEvent::Completed(ResourceKind::Page))
            .await
            .unwrap();
        drop(tx);

        let summary = handle.await.unwrap();
        assert_eq!(summary.pages_admitted, 1);
        assert_eq!(summary.pages_done, 1);
    }

    #[test]
    fn test_summary_display() {
        let mut summary = CrawlSummary::default();
        summary.record(CrawlEvent::Admitted(ResourceKind::Page));
        summary.record(CrawlEvent::Completed(ResourceKind::Page));

        let text = summary.to_string();
        assert!(text.contains("pages 1/1 done"));
    }
}
