use crate::extract::ContentExtractor;
use crate::fetch::Fetcher;
use crate::types::{HarvestResult, ItemDescriptor};
use crate::{GleanerConfig, GleanerError, Result};
use futures::{stream, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, warn};

/// The backoff before a given attempt: zero for the first attempt, then
/// one backoff unit more per attempt after that.
pub fn backoff_delay(attempt: u32, unit: Duration) -> Duration {
    unit * attempt
}

/// The `Harvester` struct runs the fetch+extract phase over the full
/// item set: at most `concurrency_limit` items in flight at once, a
/// sequential retry loop with linear backoff per item, and tolerance for
/// individual item failure.
///
/// A failed item contributes nothing to the corpus. It is counted and
/// logged, never allowed to abort the batch; a multi-thousand-item
/// harvest survives intermittent link rot.
pub struct Harvester {
    /// The shared fetcher (same transport as catalog paging).
    fetcher: Fetcher,
    /// The extractor that turns raw pages into searchable text.
    extractor: ContentExtractor,
    /// The run configuration.
    config: GleanerConfig,
    /// The progress display for the harvest bar.
    progress: MultiProgress,
}

impl Harvester {
    /// Creates a new `Harvester`.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The shared fetcher.
    /// * `extractor` - The content extractor for the target site.
    /// * `config` - The run configuration.
    pub fn new(fetcher: Fetcher, extractor: ContentExtractor, config: GleanerConfig) -> Self {
        Self {
            fetcher,
            extractor,
            config,
            progress: MultiProgress::new(),
        }
    }

    /// Harvests every item and returns the corpus.
    ///
    /// The corpus preserves the original listing order even though
    /// fetches complete out of order, holds at most one result per item,
    /// and contains nothing for items whose every attempt failed. When a
    /// harvest deadline is configured and expires, in-flight and queued
    /// items are cancelled and everything collected so far is returned.
    ///
    /// # Arguments
    ///
    /// * `items` - The discovered item descriptors.
    ///
    /// # Returns
    ///
    /// The harvested corpus, in listing order.
    pub async fn harvest(&self, items: Vec<ItemDescriptor>) -> Vec<HarvestResult> {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        info!(
            "harvesting {} items ({} concurrent, {} attempts each)",
            total, self.config.concurrency_limit, self.config.max_attempts
        );

        let bar = self.progress.add(ProgressBar::new(total as u64));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.green} {pos}/{len} {msg}")
                .unwrap(),
        );

        let deadline = self.config.harvest_timeout().map(|limit| Instant::now() + limit);

        let mut in_flight = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| {
                let bar = bar.clone();
                async move {
                    let result = self.harvest_item(&item).await;
                    bar.inc(1);
                    (index, result)
                }
            })
            .buffer_unordered(self.config.concurrency_limit);

        // One slot per input item, filled as completions arrive, so the
        // corpus keeps listing order no matter the completion order.
        let mut slots: Vec<Option<HarvestResult>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        let mut failed = 0usize;

        loop {
            let next = match deadline {
                Some(deadline) => match timeout_at(deadline, in_flight.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!("harvest deadline reached, keeping partial corpus");
                        break;
                    }
                },
                None => in_flight.next().await,
            };

            match next {
                Some((index, Some(result))) => slots[index] = Some(result),
                Some((_, None)) => failed += 1,
                None => break,
            }
        }

        // Cancels anything still in flight after a deadline break.
        drop(in_flight);

        let corpus: Vec<HarvestResult> = slots.into_iter().flatten().collect();

        bar.finish_with_message(format!(
            "Completed: {} of {} items harvested",
            corpus.len(),
            total
        ));
        info!(
            "harvest finished: {}/{} items, {} failed",
            corpus.len(),
            total,
            failed
        );

        corpus
    }

    /// Fetches one item page, turning a non-success status into an error
    /// so the retry loop treats it like any other failed attempt.
    async fn fetch_item_page(&self, url: &str) -> Result<String> {
        let (status, body) = self.fetcher.get(url).await?;

        if !status.is_success() {
            return Err(GleanerError::StatusError {
                status,
                url: url.to_string(),
            });
        }

        Ok(body)
    }

    /// Harvests one item: a fixed initial delay, then up to
    /// `max_attempts` sequential fetch attempts with linear backoff.
    ///
    /// Transport errors and non-success statuses are retried while
    /// attempts remain. An extraction failure is terminal for the item:
    /// the content already arrived, and fetching it again would return
    /// the same markup.
    ///
    /// # Returns
    ///
    /// `Some(HarvestResult)` on success, `None` when the item is dropped.
    async fn harvest_item(&self, item: &ItemDescriptor) -> Option<HarvestResult> {
        // Spreads the initial burst of a fresh worker pool.
        sleep(self.config.initial_delay()).await;

        for attempt in 0..self.config.max_attempts {
            let wait = backoff_delay(attempt, self.config.backoff_unit());
            if !wait.is_zero() {
                sleep(wait).await;
            }

            let last_attempt = attempt + 1 == self.config.max_attempts;

            // Transport errors and bad statuses are both worth another
            // attempt; only the attempt budget separates them from failure.
            let body = match self.fetch_item_page(&item.source_url).await {
                Ok(body) => body,
                Err(e) => {
                    if last_attempt {
                        warn!(
                            "{}: dropped after {} attempts ({})",
                            item.id, self.config.max_attempts, e
                        );
                        return None;
                    }
                    debug!("{}: attempt {} failed ({}), retrying", item.id, attempt, e);
                    continue;
                }
            };

            return match self.extractor.extract(&body) {
                Ok(text) => Some(HarvestResult {
                    id: item.id.clone(),
                    // Listing metadata is searchable even when the page
                    // itself yields little.
                    text: format!(
                        "{} {} {}",
                        item.title.to_lowercase(),
                        item.brand.to_lowercase(),
                        text
                    )
                    .trim()
                    .to_string(),
                    title: item.title.clone(),
                    brand: item.brand.clone(),
                }),
                Err(e) => {
                    warn!("{}: dropped ({})", item.id, e);
                    None
                }
            };
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant as StdInstant;

    fn test_config(server_url: &str) -> GleanerConfig {
        GleanerConfig {
            site_base: server_url.to_string(),
            initial_delay_ms: 1,
            backoff_unit_ms: 1,
            page_delay_ms: 1,
            ..GleanerConfig::default()
        }
    }

    fn descriptor(id: &str, url: String) -> ItemDescriptor {
        ItemDescriptor {
            id: id.to_string(),
            source_url: url,
            title: format!("{id} Title"),
            brand: "Acme".to_string(),
        }
    }

    fn product_page(copy: &str) -> String {
        format!(r#"<html><body><div class="product-description"><p>{copy}</p></div></body></html>"#)
    }

    fn harvester(config: &GleanerConfig) -> Harvester {
        Harvester::new(
            Fetcher::new(config).unwrap(),
            ContentExtractor::default(),
            config.clone(),
        )
    }

    #[test]
    fn test_backoff_is_linear_in_attempt_index() {
        let unit = Duration::from_millis(200);

        assert_eq!(backoff_delay(0, unit), Duration::ZERO);
        assert_eq!(backoff_delay(1, unit), Duration::from_millis(200));
        assert_eq!(backoff_delay(2, unit), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_harvest_combines_listing_metadata_with_page_text() {
        let mut server = mockito::Server::new_async().await;
        let config = test_config(&server.url());

        let _page = server
            .mock("GET", "/p-mp1")
            .with_status(200)
            .with_body(product_page("Hand-beaded sequin bodice"))
            .create_async()
            .await;

        let items = vec![descriptor("MP1", format!("{}/p-mp1", server.url()))];
        let corpus = harvester(&config).harvest(items).await;

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].id, "MP1");
        assert!(corpus[0].text.contains("hand-beaded sequin bodice"));
        assert!(corpus[0].text.contains("mp1 title"));
        assert!(corpus[0].text.contains("acme"));
    }

    #[tokio::test]
    async fn test_persistent_failure_consumes_every_attempt_then_drops() {
        let mut server = mockito::Server::new_async().await;
        let config = test_config(&server.url());

        let failing = server
            .mock("GET", "/p-mp1")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;
        let _ok = server
            .mock("GET", "/p-mp2")
            .with_status(200)
            .with_body(product_page("Plain cotton dress"))
            .create_async()
            .await;

        let items = vec![
            descriptor("MP1", format!("{}/p-mp1", server.url())),
            descriptor("MP2", format!("{}/p-mp2", server.url())),
        ];
        let corpus = harvester(&config).harvest(items).await;

        // The broken item is absent, not present with empty text.
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].id, "MP2");
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn test_extraction_failure_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let config = test_config(&server.url());

        let empty = server
            .mock("GET", "/p-mp1")
            .with_status(200)
            .with_body("<html><body></body></html>")
            .expect(1)
            .create_async()
            .await;

        let items = vec![descriptor("MP1", format!("{}/p-mp1", server.url()))];
        let corpus = harvester(&config).harvest(items).await;

        assert!(corpus.is_empty());
        empty.assert_async().await;
    }

    #[tokio::test]
    async fn test_corpus_preserves_listing_order() {
        let mut server = mockito::Server::new_async().await;
        let mut config = test_config(&server.url());
        config.concurrency_limit = 4;

        let mut mocks = Vec::new();
        for i in 0..8 {
            let mock = server
                .mock("GET", format!("/p-mp{i}").as_str())
                .with_status(200)
                .with_body(product_page(&format!("copy for item {i}")))
                .create_async()
                .await;
            mocks.push(mock);
        }

        let items: Vec<ItemDescriptor> = (0..8)
            .map(|i| descriptor(&format!("MP{i}"), format!("{}/p-mp{i}", server.url())))
            .collect();
        let corpus = harvester(&config).harvest(items).await;

        let ids: Vec<&str> = corpus.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["MP0", "MP1", "MP2", "MP3", "MP4", "MP5", "MP6", "MP7"]);
    }

    #[tokio::test]
    async fn test_concurrency_cap_still_parallelizes() {
        let mut server = mockito::Server::new_async().await;
        let mut config = test_config(&server.url());
        config.concurrency_limit = 5;
        config.initial_delay_ms = 100;

        let _page = server
            .mock("GET", "/p-item")
            .with_status(200)
            .with_body(product_page("linen shirt"))
            .expect(10)
            .create_async()
            .await;

        let items: Vec<ItemDescriptor> = (0..10)
            .map(|i| descriptor(&format!("MP{i}"), format!("{}/p-item", server.url())))
            .collect();

        let start = StdInstant::now();
        let corpus = harvester(&config).harvest(items).await;
        let elapsed = start.elapsed();

        assert_eq!(corpus.len(), 10);
        // Two waves of five 100ms initial delays, nowhere near the
        // 1000ms a serial run would take.
        assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(700), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_deadline_keeps_partial_corpus() {
        let mut server = mockito::Server::new_async().await;
        let mut config = test_config(&server.url());
        config.concurrency_limit = 1;
        config.initial_delay_ms = 80;
        config.harvest_timeout_ms = 120;

        let _page = server
            .mock("GET", "/p-item")
            .with_status(200)
            .with_body(product_page("wool scarf"))
            .create_async()
            .await;

        let items: Vec<ItemDescriptor> = (0..6)
            .map(|i| descriptor(&format!("MP{i}"), format!("{}/p-item", server.url())))
            .collect();

        let start = StdInstant::now();
        let corpus = harvester(&config).harvest(items).await;
        let elapsed = start.elapsed();

        // The deadline fires mid-run: fewer than all six, collected work kept.
        assert!(corpus.len() < 6);
        assert!(elapsed < Duration::from_millis(600), "elapsed {elapsed:?}");
        for result in &corpus {
            assert!(result.text.contains("wool scarf"));
        }
    }
}
