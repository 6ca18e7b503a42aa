//! Image download workers
//!
//! Downloaders pull admitted image addresses off the waiting queue, retrieve
//! the payload and write it into the mirror directory under the address's own
//! path. Each admitted image is written by exactly one worker, so no file is
//! ever contended.

use super::{next_item, send_or_shutdown, Outcome, WorkItem};
use crate::url::mirror_path;
use crate::Result;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use url::Url;

/// Fetches an image and writes it under the mirror root
///
/// Parent directories are created on demand. Returns the path written.
pub async fn mirror_image(
    client: &Client,
    mirror_root: &Path,
    url: &Url,
) -> Result<PathBuf> {
    let response = client.get(url.clone()).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    let target = mirror_path(mirror_root, url);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, &bytes).await?;

    Ok(target)
}

/// Image downloader worker loop
pub async fn run_image_downloader(
    worker_id: usize,
    client: Client,
    mirror_root: PathBuf,
    images_rx: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
    outcomes_tx: mpsc::Sender<Outcome>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    tracing::debug!("Downloader {} started", worker_id);

    loop {
        let item = tokio::select! {
            item = next_item(&images_rx) => match item {
                Some(i) => i,
                None => break,
            },
            _ = shutdown.wait_for(|stop| *stop) => break,
        };

        let outcome = match mirror_image(&client, &mirror_root, &item.url).await {
            Ok(target) => {
                tracing::debug!(
                    "Downloader {}: {} -> {}",
                    worker_id,
                    item.url,
                    target.display()
                );
                Outcome::done(item)
            }
            Err(e) => {
                tracing::warn!("Downloader {}: {} failed: {}", worker_id, item.url, e);
                Outcome::failed(item)
            }
        };

        if !send_or_shutdown(&outcomes_tx, outcome, &mut shutdown).await {
            break;
        }
    }

    tracing::debug!("Downloader {} exiting", worker_id);
    Ok(())
}
