//! Completion notifier
//!
//! The single writer of terminal states. Fetchers, downloaders and harvesters
//! report every finished item here; the notifier commits `Done` or `Failed`
//! to the store and only then lets the item's completion guard go, so an
//! address is never both "finished" and uncommitted.

use super::{lock_store, CrawlEvent, Disposition, Outcome, SharedStore};
use crate::storage::Store;
use crate::Result;
use tokio::sync::{mpsc, watch};

/// Notifier loop: commit terminal states as outcomes arrive
///
/// A store failure here is fatal, same as in admission.
pub async fn run_notifier(
    store: SharedStore,
    mut outcomes_rx: mpsc::Receiver<Outcome>,
    events_tx: mpsc::Sender<CrawlEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    tracing::debug!("Completion notifier started");

    loop {
        let outcome = tokio::select! {
            outcome = outcomes_rx.recv() => match outcome {
                Some(o) => o,
                None => break,
            },
            _ = shutdown.wait_for(|stop| *stop) => break,
        };

        let url = outcome.item.url.as_str();
        let event = match outcome.disposition {
            Disposition::Done => {
                lock_store(&store)?.mark_done(url)?;
                tracing::debug!("Done: {}", url);
                CrawlEvent::Completed(outcome.item.kind)
            }
            Disposition::Failed => {
                lock_store(&store)?.mark_failed(url)?;
                tracing::debug!("Failed: {}", url);
                CrawlEvent::Failed(outcome.item.kind)
            }
        };
        let _ = events_tx.send(event).await;

        // outcome drops here, releasing the guard after the commit
    }

    tracing::debug!("Completion notifier exiting");
    Ok(())
}
