//! Crawl coordinator
//!
//! Owns the whole pipeline for one crawl session: opens the store, builds the
//! HTTP client and robots gate, wires the bounded queues, spawns the worker
//! pools and singleton roles, seeds the discovered queue, and waits for the
//! crawl to drain (or for Ctrl-C). Shutdown is a watch signal every worker
//! loop selects on; the coordinator then joins every task and reports the
//! final summary.

use super::{
    build_http_client, downloader, fetcher, harvester, manager, notifier, stats, CrawlSummary,
    SharedStore, WorkItem,
};
use crate::robots::fetch_robots_gate;
use crate::state::ResourceKind;
use crate::storage::open_store;
use crate::url::UrlFilter;
use crate::{Config, KagamiError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use url::Url;

/// Runs a crawl session from a validated configuration
pub struct Coordinator {
    config: Config,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<CrawlSummary> {
        let seed = Url::parse(&self.config.crawl.seed)
            .map_err(|e| crate::UrlError::Parse(format!("{}: {}", self.config.crawl.seed, e)))?;
        let filter = UrlFilter::from_config(
            self.config.filter.pattern.as_deref(),
            &self.config.filter.keywords,
        )?;
        let user_agent = self.config.user_agent.header_value();
        let mirror_root = PathBuf::from(&self.config.output.mirror_dir);

        let client = build_http_client(&self.config.user_agent)?;
        let store: SharedStore = Arc::new(std::sync::Mutex::new(open_store(Path::new(
            &self.config.output.database_path,
        ))?));
        tokio::fs::create_dir_all(&mirror_root).await?;

        let gate = fetch_robots_gate(&client, &seed, &user_agent).await;

        tracing::info!("Crawling {} into {}", seed, mirror_root.display());

        let cap = self.config.crawl.queue_size;
        let (discovered_tx, discovered_rx) = mpsc::channel::<WorkItem>(cap);
        let (pages_tx, pages_rx) = mpsc::channel::<WorkItem>(cap);
        let (images_tx, images_rx) = mpsc::channel::<WorkItem>(cap);
        let (content_tx, content_rx) = mpsc::channel::<fetcher::PageContent>(cap);
        let (outcomes_tx, outcomes_rx) = mpsc::channel(cap);
        let (events_tx, events_rx) = mpsc::channel(cap);
        let (guard_tx, mut guard_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let stats_handle = tokio::spawn(stats::run_stats(events_rx));

        let mut tasks: Vec<JoinHandle<Result<()>>> = Vec::new();

        tasks.push(tokio::spawn(manager::run_manager(
            store.clone(),
            gate,
            discovered_rx,
            pages_tx,
            images_tx,
            events_tx.clone(),
            shutdown_rx.clone(),
        )));

        tasks.push(tokio::spawn(notifier::run_notifier(
            store.clone(),
            outcomes_rx,
            events_tx.clone(),
            shutdown_rx.clone(),
        )));

        let pages_rx = Arc::new(Mutex::new(pages_rx));
        for worker_id in 0..self.config.crawl.page_workers {
            tasks.push(tokio::spawn(fetcher::run_page_fetcher(
                worker_id,
                client.clone(),
                pages_rx.clone(),
                content_tx.clone(),
                outcomes_tx.clone(),
                shutdown_rx.clone(),
            )));
        }

        let content_rx = Arc::new(Mutex::new(content_rx));
        for worker_id in 0..self.config.crawl.harvesters {
            tasks.push(tokio::spawn(harvester::run_harvester(
                worker_id,
                filter.clone(),
                content_rx.clone(),
                discovered_tx.clone(),
                outcomes_tx.clone(),
                shutdown_rx.clone(),
            )));
        }

        let images_rx = Arc::new(Mutex::new(images_rx));
        for worker_id in 0..self.config.crawl.image_workers {
            tasks.push(tokio::spawn(downloader::run_image_downloader(
                worker_id,
                client.clone(),
                mirror_root.clone(),
                images_rx.clone(),
                outcomes_tx.clone(),
                shutdown_rx.clone(),
            )));
        }

        // Workers hold their own clones; the channels must close with them.
        drop(content_tx);
        drop(outcomes_tx);
        drop(events_tx);

        let seed_item = WorkItem::new(seed, ResourceKind::Page, &guard_tx);
        drop(guard_tx);
        discovered_tx
            .send(seed_item)
            .await
            .map_err(|_| KagamiError::Pipeline("discovered queue closed before seeding".into()))?;
        drop(discovered_tx);

        tokio::select! {
            _ = guard_rx.recv() => {
                tracing::info!("Crawl drained, shutting down workers");
            }
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => tracing::info!("Interrupt received, shutting down workers"),
                    Err(e) => tracing::warn!("Signal listener failed ({}), shutting down", e),
                }
            }
        }

        let _ = shutdown_tx.send(true);

        let mut first_error: Option<KagamiError> = None;
        for task in tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!("Worker failed: {}", e);
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    let e = KagamiError::Pipeline(format!("worker task panicked: {}", e));
                    tracing::error!("{}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        let summary = stats_handle
            .await
            .map_err(|e| KagamiError::Pipeline(format!("stats task panicked: {}", e)))?;

        if let Some(e) = first_error {
            return Err(e);
        }

        tracing::info!("Crawl finished: {}", summary);
        Ok(summary)
    }
}

/// Convenience wrapper around [`Coordinator`]
pub async fn run_crawl(config: Config) -> Result<CrawlSummary> {
    Coordinator::new(config).run().await
}
