//! Concurrent paginated fetching.
//!
//! Once the total number of elements is known from a probe, every page is requested
//! at once, each one delayed by `page offset × stagger` so the requests reach the server
//! as a wave rather than a burst. All pages are awaited together and the first failure
//! fails the whole batch.

use std::time::Duration;

use futures::future::try_join_all;
use rand::Rng;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::debug;

use super::client::KosClient;
use super::error::{KosError, ParseError};
use super::request::ResourceRequest;
use super::types::Page;
use crate::config::ApiConfig;

/// Pause taken before a request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    None,
    /// Uniformly random in `[0, max)`
    Jitter(Duration),
    Fixed(Duration),
}

impl Delay {
    /// Resolves the delay to a concrete duration.
    pub fn duration(self) -> Duration {
        match self {
            Delay::None => Duration::ZERO,
            Delay::Fixed(d) => d,
            Delay::Jitter(max) if max.is_zero() => Duration::ZERO,
            Delay::Jitter(max) => {
                let millis = rand::thread_rng().gen_range(0..max.as_millis().max(1) as u64);
                Duration::from_millis(millis)
            }
        }
    }
}

/// Number of pages of `page_size` needed to hold `total` elements.
pub fn page_count(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

/// A page request together with the pause before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledPage {
    pub request: ResourceRequest,
    pub delay: Duration,
}

/// Schedules requests for concurrent page fetches.
pub struct Paginator<'a> {
    client: &'a KosClient,
    page_size: u32,
    stagger: Duration,
    limiter: Option<Semaphore>,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a KosClient, config: &ApiConfig) -> Self {
        Self {
            client,
            page_size: config.page_size,
            stagger: config.stagger,
            limiter: config.max_concurrency.map(Semaphore::new),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Plans one request per page of `base` for `total` elements.
    ///
    /// `offset` shifts the stagger so several resources can share one wave: page `p`
    /// waits `(offset + p) × stagger`.
    pub fn schedule(&self, base: &ResourceRequest, total: u64, offset: u64) -> Vec<ScheduledPage> {
        (0..page_count(total, self.page_size))
            .map(|page| ScheduledPage {
                request: base.clone().with_size(self.page_size).with_page(page),
                delay: stagger_delay(self.stagger, offset + page),
            })
            .collect()
    }

    /// Fetches every scheduled page concurrently and concatenates the items in page order.
    pub async fn fetch_all<T, P>(&self, pages: &[ScheduledPage], parser: P) -> Result<Vec<T>, KosError>
    where
        P: Fn(Value) -> Result<T, ParseError>,
    {
        debug!(pages = pages.len(), "Fetching pages");

        let results = try_join_all(
            pages
                .iter()
                .map(|page| self.fetch_one(&page.request, &parser, Delay::Fixed(page.delay))),
        )
        .await?;

        Ok(results.into_iter().flat_map(|page| page.items).collect())
    }

    /// Fetches a single request, honouring the concurrency limit.
    pub async fn fetch_one<T, P>(
        &self,
        request: &ResourceRequest,
        parser: P,
        delay: Delay,
    ) -> Result<Page<T>, KosError>
    where
        P: Fn(Value) -> Result<T, ParseError>,
    {
        let wait = delay.duration();
        if !wait.is_zero() {
            debug!(request = %request, delay_ms = wait.as_millis() as u64, "Waiting before request");
            tokio::time::sleep(wait).await;
        }

        // Closed only on drop, so a failed acquire just means no limit
        let _permit = match &self.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        };

        self.client.fetch(request, parser).await
    }
}

fn stagger_delay(stagger: Duration, position: u64) -> Duration {
    stagger.saturating_mul(u32::try_from(position).unwrap_or(u32::MAX))
}
