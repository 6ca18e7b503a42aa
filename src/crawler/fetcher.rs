//! Page fetching workers
//!
//! Fetchers pull admitted page addresses off the waiting queue, retrieve the
//! markup over the shared HTTP client, and hand the body to the harvesters.
//! A failed retrieval is reported straight to the notifier; the address stays
//! failed, there is no retry.

use super::{next_item, send_or_shutdown, Outcome, WorkItem};
use crate::Result;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use url::Url;

/// A fetched page on its way to a harvester
#[derive(Debug)]
pub struct PageContent {
    pub item: WorkItem,
    pub body: String,
}

/// Retrieves the markup for a single page
///
/// Non-2xx statuses are errors; the body is decoded as text.
pub async fn fetch_page(client: &Client, url: &Url) -> reqwest::Result<String> {
    client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// Page fetcher worker loop
pub async fn run_page_fetcher(
    worker_id: usize,
    client: Client,
    pages_rx: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
    content_tx: mpsc::Sender<PageContent>,
    outcomes_tx: mpsc::Sender<Outcome>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    tracing::debug!("Page fetcher {} started", worker_id);

    loop {
        let item = tokio::select! {
            item = next_item(&pages_rx) => match item {
                Some(i) => i,
                None => break,
            },
            _ = shutdown.wait_for(|stop| *stop) => break,
        };

        match fetch_page(&client, &item.url).await {
            Ok(body) => {
                tracing::debug!(
                    "Fetcher {}: retrieved {} ({} bytes)",
                    worker_id,
                    item.url,
                    body.len()
                );
                if !send_or_shutdown(&content_tx, PageContent { item, body }, &mut shutdown).await
                {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Fetcher {}: {} failed: {}", worker_id, item.url, e);
                if !send_or_shutdown(&outcomes_tx, Outcome::failed(item), &mut shutdown).await {
                    break;
                }
            }
        }
    }

    tracing::debug!("Page fetcher {} exiting", worker_id);
    Ok(())
}
