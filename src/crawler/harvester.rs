//! Markup harvesting: link and image extraction
//!
//! Harvesters sit between the page fetchers and the queue manager. They parse
//! fetched markup, resolve every `a[href]` and `img[src]` against the page's
//! own address, run the discovery filter, and push surviving candidates back
//! into the discovered queue. The page itself is reported as done only after
//! all of its candidates were submitted.

use super::{next_item, send_or_shutdown, Outcome, PageContent, WorkItem};
use crate::state::ResourceKind;
use crate::url::{resolve_candidate, UrlFilter};
use crate::Result;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use url::Url;

/// Candidates extracted from one page
#[derive(Debug, Default)]
pub struct Harvest {
    pub pages: Vec<Url>,
    pub images: Vec<Url>,
}

impl Harvest {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.images.is_empty()
    }
}

/// Extracts filtered page and image candidates from an HTML document
///
/// Pure function over the markup: no network, no store. Candidates that fail
/// to resolve are logged and skipped; duplicates within the same document are
/// collapsed. Order of first appearance is preserved.
pub fn harvest(html: &str, page_url: &Url, filter: &UrlFilter) -> Harvest {
    let document = Html::parse_document(html);

    let link_selector = Selector::parse("a[href]").expect("static selector");
    let image_selector = Selector::parse("img[src]").expect("static selector");

    let mut harvest = Harvest::default();
    let mut seen: HashSet<Url> = HashSet::new();

    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href") {
            collect_candidate(href, page_url, filter, &mut seen, &mut harvest.pages);
        }
    }

    for element in document.select(&image_selector) {
        if let Some(src) = element.value().attr("src") {
            collect_candidate(src, page_url, filter, &mut seen, &mut harvest.images);
        }
    }

    harvest
}

fn collect_candidate(
    raw: &str,
    page_url: &Url,
    filter: &UrlFilter,
    seen: &mut HashSet<Url>,
    out: &mut Vec<Url>,
) {
    let resolved = match resolve_candidate(raw, page_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Skipping candidate {:?} on {}: {}", raw, page_url, e);
            return;
        }
    };

    if !filter.matches(&resolved) {
        tracing::trace!("Filtered out {}", resolved);
        return;
    }

    if seen.insert(resolved.clone()) {
        out.push(resolved);
    }
}

/// Harvester worker loop
///
/// Receives fetched pages from the content queue, submits their candidates to
/// the discovered queue, then forwards the page itself to the notifier as
/// done. Exits when the content queue closes or shutdown is signalled.
pub async fn run_harvester(
    worker_id: usize,
    filter: UrlFilter,
    content_rx: Arc<Mutex<mpsc::Receiver<PageContent>>>,
    discovered_tx: mpsc::Sender<WorkItem>,
    outcomes_tx: mpsc::Sender<Outcome>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    tracing::debug!("Harvester {} started", worker_id);

    loop {
        let content = tokio::select! {
            content = next_item(&content_rx) => match content {
                Some(c) => c,
                None => break,
            },
            _ = shutdown.wait_for(|stop| *stop) => break,
        };

        let PageContent { item, body } = content;
        let found = harvest(&body, &item.url, &filter);

        if found.is_empty() {
            tracing::trace!("Harvester {}: nothing harvestable on {}", worker_id, item.url);
        } else {
            tracing::debug!(
                "Harvester {}: {} page(s), {} image(s) on {}",
                worker_id,
                found.pages.len(),
                found.images.len(),
                item.url
            );
        }

        let mut delivered = true;
        for url in found.pages {
            let child = item.child(url, ResourceKind::Page);
            if !send_or_shutdown(&discovered_tx, child, &mut shutdown).await {
                delivered = false;
                break;
            }
        }
        if delivered {
            for url in found.images {
                let child = item.child(url, ResourceKind::Image);
                if !send_or_shutdown(&discovered_tx, child, &mut shutdown).await {
                    delivered = false;
                    break;
                }
            }
        }
        if !delivered {
            break;
        }

        // All candidates submitted; only now may the page complete.
        if !send_or_shutdown(&outcomes_tx, Outcome::done(item), &mut shutdown).await {
            break;
        }
    }

    tracing::debug!("Harvester {} exiting", worker_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://x.test/manga/ch1/").unwrap()
    }

    #[test]
    fn test_harvest_links_and_images() {
        let html = r#"
            <html><body>
                <a href="/manga/ch2">next</a>
                <a href="https://other.test/about">elsewhere</a>
                <img src="page-01.png">
            </body></html>
        "#;
        let found = harvest(html, &base(), &UrlFilter::MatchAll);

        assert_eq!(
            found.pages,
            vec![
                Url::parse("https://x.test/manga/ch2").unwrap(),
                Url::parse("https://other.test/about").unwrap(),
            ]
        );
        assert_eq!(
            found.images,
            vec![Url::parse("https://x.test/manga/ch1/page-01.png").unwrap()]
        );
    }

    #[test]
    fn test_harvest_skips_non_fetchable_schemes() {
        let html = r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:admin@x.test">mail</a>
            <a href="#top">anchor</a>
            <a href="/real">real</a>
        "##;
        let found = harvest(html, &base(), &UrlFilter::MatchAll);

        assert_eq!(found.pages, vec![Url::parse("https://x.test/real").unwrap()]);
    }

    #[test]
    fn test_harvest_dedups_within_document() {
        let html = r##"
            <a href="/p">one</a>
            <a href="/p">two</a>
            <a href="/p#section">three</a>
        "##;
        let found = harvest(html, &base(), &UrlFilter::MatchAll);

        assert_eq!(found.pages.len(), 1);
    }

    #[test]
    fn test_harvest_applies_filter_to_both_kinds() {
        let html = r#"
            <a href="https://x.test/manga/ch2">keep</a>
            <a href="https://x.test/news/today">drop</a>
            <img src="https://x.test/manga/p1.png">
            <img src="https://cdn.test/banner.png">
        "#;
        let filter = UrlFilter::from_config(None, &["manga".to_string()]).unwrap();
        let found = harvest(html, &base(), &filter);

        assert_eq!(found.pages.len(), 1);
        assert_eq!(found.images.len(), 1);
        assert!(found.pages[0].as_str().contains("manga"));
        assert!(found.images[0].as_str().contains("manga"));
    }

    #[test]
    fn test_harvest_empty_document() {
        let found = harvest("<html><body>nothing here</body></html>", &base(), &UrlFilter::MatchAll);
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_worker_reports_page_after_candidates() {
        let (content_tx, content_rx) = mpsc::channel(4);
        let (discovered_tx, mut discovered_rx) = mpsc::channel(16);
        let (outcomes_tx, mut outcomes_rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (guard_tx, _guard_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(run_harvester(
            0,
            UrlFilter::MatchAll,
            Arc::new(Mutex::new(content_rx)),
            discovered_tx,
            outcomes_tx,
            shutdown_rx,
        ));

        let item = WorkItem::new(base(), ResourceKind::Page, &guard_tx);
        content_tx
            .send(PageContent {
                item,
                body: r#"<a href="/p2">x</a><img src="/i.png">"#.to_string(),
            })
            .await
            .unwrap();
        drop(content_tx);

        let first = discovered_rx.recv().await.unwrap();
        assert_eq!(first.kind, ResourceKind::Page);
        let second = discovered_rx.recv().await.unwrap();
        assert_eq!(second.kind, ResourceKind::Image);

        let outcome = outcomes_rx.recv().await.unwrap();
        assert_eq!(outcome.disposition, super::super::Disposition::Done);
        assert_eq!(outcome.item.url, base());

        handle.await.unwrap().unwrap();
    }
}
