// src/pipeline/crawl.rs

//! Paper crawling pipeline.

use chrono::{DateTime, Utc};

use crate::config::CrawlContext;
use crate::error::Result;
use crate::models::{Config, Paper, TimeWindow};
use crate::services::{FeedClient, FeedSource, MergedIndex, PaginationWalker, build_source};

/// Crawls every configured category for one window and merges the results.
pub struct CrawlOrchestrator {
    context: CrawlContext,
    source: Box<dyn FeedSource>,
}

impl CrawlOrchestrator {
    pub fn new(context: CrawlContext, source: Box<dyn FeedSource>) -> Self {
        Self { context, source }
    }

    /// Wire the context, client and source described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let context = CrawlContext::from_config(config)?;
        let client = FeedClient::new(&config.crawler)?;
        let source = build_source(&config.feed, &context, client)?;
        Ok(Self::new(context, source))
    }

    /// Papers announced in the window that closed most recently.
    pub async fn fetch_window_papers(&self) -> Result<Vec<Paper>> {
        self.fetch_papers_at(Utc::now()).await
    }

    /// Papers for the window that applies at `now`.
    pub async fn fetch_papers_at(&self, now: DateTime<Utc>) -> Result<Vec<Paper>> {
        let window = self.context.calculator.window_at(now)?;
        self.fetch_papers_in(&window).await
    }

    /// Papers for an explicit window, deduplicated across categories.
    ///
    /// Any category failing aborts the crawl; partial results are discarded.
    pub async fn fetch_papers_in(&self, window: &TimeWindow) -> Result<Vec<Paper>> {
        log::info!(
            "Crawling {} categories via {} for {}",
            self.context.categories.len(),
            self.context.protocol,
            window
        );

        let walker = PaginationWalker::new(self.source.as_ref(), self.context.pacer);
        let mut index = MergedIndex::new();

        for (i, code) in self.context.categories.iter().enumerate() {
            let Some(query) = self.source.address(code) else {
                log::warn!("Skipping malformed category code '{code}'");
                continue;
            };
            if i > 0 {
                self.context.pacer.pause().await;
            }

            let records = walker.walk(&query, window).await?;
            let fetched = records.len();
            let mut added = 0;
            for record in records {
                if let Some(paper) = Paper::from_record(record, &self.context.abs_url_base) {
                    if index.insert(paper) {
                        added += 1;
                    }
                }
            }
            log::info!("{code}: {fetched} records, {added} new");
        }

        log::info!("Crawl complete: {} unique papers", index.len());
        Ok(index.into_papers())
    }
}

/// Run the crawler once for the current window.
pub async fn run_crawler(config: &Config) -> Result<Vec<Paper>> {
    CrawlOrchestrator::from_config(config)?
        .fetch_window_papers()
        .await
}
