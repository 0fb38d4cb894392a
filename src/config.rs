// src/config.rs

//! Configuration loading and the derived crawl context.
//!
//! `Config` is what the user wrote; `CrawlContext` is what a crawl needs,
//! parsed once up front so bad zones or anchors fail before any request.

use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::models::{Config, FeedProtocol, Zone};
use crate::services::TimeWindowCalculator;
use crate::utils::Pacer;

/// Immutable inputs of one crawl, derived from [`Config`].
#[derive(Debug, Clone)]
pub struct CrawlContext {
    /// Category codes in configured order, blanks removed
    pub categories: Vec<String>,
    pub calculator: TimeWindowCalculator,
    /// Zone the feed interprets request dates in
    pub feed_zone: Zone,
    pub protocol: FeedProtocol,
    pub abs_url_base: String,
    /// Pause between consecutive feed requests
    pub pacer: Pacer,
}

impl CrawlContext {
    pub fn from_config(config: &Config) -> Result<Self> {
        let window_zone: Zone = config.window.zone.parse()?;
        let feed_zone: Zone = config.feed.reference_zone.parse()?;
        let calculator = TimeWindowCalculator::new(window_zone, &config.window.anchor_hours)?;

        let categories = config
            .feed
            .categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            categories,
            calculator,
            feed_zone,
            protocol: config.feed.protocol,
            abs_url_base: config.feed.abs_url_base.clone(),
            pacer: Pacer::new(Duration::from_millis(config.crawler.request_delay_ms)),
        })
    }
}

/// Load a configuration file, apply environment overrides and validate it.
///
/// A missing or unreadable file falls back to defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path);
    config.apply_env();
    config.validate()?;
    Ok(config)
}
