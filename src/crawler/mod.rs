//! Crawler module: the crawl orchestration pipeline
//!
//! This module contains the cooperating worker roles that make up a crawl:
//! - The queue manager, sole authority over admission and deduplication
//! - Page fetchers retrieving markup
//! - Harvesters extracting candidate links and images from markup
//! - Image downloaders persisting payloads into the mirror directory
//! - The completion notifier committing terminal states to the store
//! - A stats aggregator owning all counters
//!
//! The roles are connected only by bounded mpsc queues; the state store and
//! the robots gate are the only things consulted synchronously.

mod coordinator;
mod downloader;
mod fetcher;
mod harvester;
mod manager;
mod notifier;
mod stats;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::PageContent;
pub use harvester::{harvest, Harvest};
pub use stats::{CrawlEvent, CrawlSummary};

use crate::config::UserAgentConfig;
use crate::state::ResourceKind;
use crate::storage::SqliteStore;
use crate::{Config, KagamiError, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use url::Url;

/// The state store as shared between the manager and the notifier
pub(crate) type SharedStore = Arc<std::sync::Mutex<SqliteStore>>;

/// Locks the shared store, turning a poisoned mutex into a pipeline error
pub(crate) fn lock_store(
    store: &SharedStore,
) -> Result<std::sync::MutexGuard<'_, SqliteStore>> {
    store
        .lock()
        .map_err(|_| KagamiError::Pipeline("state store mutex poisoned".to_string()))
}

/// A unit of work traveling through the pipeline
///
/// Besides the address and its kind, every item carries a completion guard: a
/// clone of the pipeline's quiescence sender. The guard is never sent on; it
/// exists so that dropping the last in-flight item closes the quiescence
/// channel and tells the coordinator the crawl has drained. Candidates
/// harvested from a page clone their guard from the page's own item, so a
/// page can never look finished while its discoveries are still unsubmitted.
#[derive(Debug)]
pub struct WorkItem {
    pub url: Url,
    pub kind: ResourceKind,
    guard: mpsc::Sender<()>,
}

impl WorkItem {
    /// Creates a root work item holding a fresh clone of the quiescence sender
    pub fn new(url: Url, kind: ResourceKind, guard: &mpsc::Sender<()>) -> Self {
        Self {
            url,
            kind,
            guard: guard.clone(),
        }
    }

    /// Creates a child item discovered while processing this one
    pub fn child(&self, url: Url, kind: ResourceKind) -> Self {
        Self {
            url,
            kind,
            guard: self.guard.clone(),
        }
    }
}

/// Terminal disposition of a processed work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Fetch/store attempt completed successfully
    Done,

    /// Fetch/store attempt failed permanently
    Failed,
}

/// A finished work item on its way to the completion notifier
#[derive(Debug)]
pub struct Outcome {
    pub item: WorkItem,
    pub disposition: Disposition,
}

impl Outcome {
    pub fn done(item: WorkItem) -> Self {
        Self {
            item,
            disposition: Disposition::Done,
        }
    }

    pub fn failed(item: WorkItem) -> Self {
        Self {
            item,
            disposition: Disposition::Failed,
        }
    }
}

/// Builds the shared HTTP client with the configured user agent
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Receives the next item from a queue shared by a worker pool
///
/// The receiver sits behind a mutex; holding it across the recv serializes
/// dequeueing but not processing.
pub(crate) async fn next_item<T>(rx: &Arc<Mutex<mpsc::Receiver<T>>>) -> Option<T> {
    rx.lock().await.recv().await
}

/// Sends into a bounded queue unless shutdown wins the race
///
/// Returns false when the value was not delivered, either because shutdown
/// was signalled or the receiving side is gone. The undelivered value is
/// dropped, releasing its completion guard.
pub(crate) async fn send_or_shutdown<T>(
    tx: &mpsc::Sender<T>,
    value: T,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    tokio::select! {
        result = tx.send(value) => result.is_ok(),
        _ = shutdown.wait_for(|stop| *stop) => false,
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the state store
/// 2. Build the HTTP client and fetch the robots policy
/// 3. Spawn the worker pools and singleton roles
/// 4. Seed the pipeline and run until quiescent (or interrupted)
pub async fn crawl(config: Config) -> Result<CrawlSummary> {
    run_crawl(config).await
}
