//! Queue/dedup manager
//!
//! The single authority over admission. Every discovered address passes
//! through here exactly once per discovery: the robots gate first, then the
//! store's atomic admission. Only addresses admitted here ever reach a
//! waiting queue, so each one is fetched at most once per crawl history.

use super::{lock_store, send_or_shutdown, CrawlEvent, SharedStore, WorkItem};
use crate::robots::RobotsGate;
use crate::state::ResourceKind;
use crate::storage::Store;
use crate::Result;
use tokio::sync::{mpsc, watch};

/// Manager loop: gate, admit, route
///
/// Denied and duplicate addresses are dropped here, which releases their
/// completion guards. A store failure during admission is fatal and takes the
/// whole crawl down.
pub async fn run_manager(
    store: SharedStore,
    gate: RobotsGate,
    mut discovered_rx: mpsc::Receiver<WorkItem>,
    pages_tx: mpsc::Sender<WorkItem>,
    images_tx: mpsc::Sender<WorkItem>,
    events_tx: mpsc::Sender<CrawlEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    tracing::debug!("Queue manager started");

    loop {
        let item = tokio::select! {
            item = discovered_rx.recv() => match item {
                Some(i) => i,
                None => break,
            },
            _ = shutdown.wait_for(|stop| *stop) => break,
        };

        if !gate.permitted(&item.url) {
            tracing::debug!("Robots gate denied {}", item.url);
            let _ = events_tx.send(CrawlEvent::Denied(item.kind)).await;
            continue;
        }

        let admitted = lock_store(&store)?.try_admit(item.url.as_str(), item.kind)?;

        if !admitted {
            tracing::trace!("Already known: {}", item.url);
            let _ = events_tx.send(CrawlEvent::Duplicate(item.kind)).await;
            continue;
        }

        tracing::debug!("Admitted {} ({})", item.url, item.kind);
        let _ = events_tx.send(CrawlEvent::Admitted(item.kind)).await;

        let delivered = match item.kind {
            ResourceKind::Page => send_or_shutdown(&pages_tx, item, &mut shutdown).await,
            ResourceKind::Image => send_or_shutdown(&images_tx, item, &mut shutdown).await,
        };
        if !delivered {
            break;
        }
    }

    tracing::debug!("Queue manager exiting");
    Ok(())
}
