//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote feed and category selection
    #[serde(default)]
    pub feed: FeedConfig,

    /// Crawl window anchoring
    #[serde(default)]
    pub window: WindowConfig,

    /// HTTP and retry behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Summarization collaborator
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Digest delivery
    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply environment overrides for secrets.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.summarizer.api_key = key;
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.feed.base_url.trim().is_empty() {
            return Err(AppError::validation("feed.base_url is empty"));
        }
        if self.feed.categories.is_empty() {
            return Err(AppError::validation("No categories defined"));
        }
        if self.feed.page_size == 0 {
            return Err(AppError::validation("feed.page_size must be > 0"));
        }
        if self.window.anchor_hours.is_empty() {
            return Err(AppError::validation("window.anchor_hours is empty"));
        }
        if let Some(hour) = self.window.anchor_hours.iter().find(|h| **h > 23) {
            return Err(AppError::validation(format!(
                "window.anchor_hours contains {hour}, expected 0-23"
            )));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_attempts == 0 {
            return Err(AppError::validation("crawler.max_attempts must be > 0"));
        }
        if self.summarizer.enabled && self.summarizer.api_key.trim().is_empty() {
            return Err(AppError::validation(
                "summarizer.api_key is not configured (set GEMINI_API_KEY)",
            ));
        }
        if self.notifier.kind == NotifierKind::Webhook {
            if self.notifier.webhook_url.trim().is_empty() {
                return Err(AppError::validation("notifier.webhook_url is empty"));
            }
            if self.notifier.recipients.is_empty() {
                return Err(AppError::validation("No notifier recipients defined"));
            }
        }
        Ok(())
    }
}

/// Which remote protocol the feed speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedProtocol {
    /// OAI-PMH `ListRecords` with resumption tokens
    #[default]
    OaiPmh,
    /// Atom query API with offset pagination
    Query,
    /// HTML "new submissions" listing page
    Listing,
}

impl fmt::Display for FeedProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedProtocol::OaiPmh => "oai_pmh",
            FeedProtocol::Query => "query",
            FeedProtocol::Listing => "listing",
        };
        f.write_str(name)
    }
}

/// Remote feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub protocol: FeedProtocol,

    /// Base endpoint of the selected protocol
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Category codes, as an array or a comma-separated string
    #[serde(
        default = "defaults::categories",
        deserialize_with = "deserialize_list"
    )]
    pub categories: Vec<String>,

    /// Records per page for offset pagination
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// OAI-PMH metadata format
    #[serde(default = "defaults::metadata_prefix")]
    pub metadata_prefix: String,

    /// Timezone the feed expects dates in
    #[serde(default = "defaults::reference_zone")]
    pub reference_zone: String,

    /// Prefix for paper links
    #[serde(default = "defaults::abs_url_base")]
    pub abs_url_base: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            protocol: FeedProtocol::default(),
            base_url: defaults::base_url(),
            categories: defaults::categories(),
            page_size: defaults::page_size(),
            metadata_prefix: defaults::metadata_prefix(),
            reference_zone: defaults::reference_zone(),
            abs_url_base: defaults::abs_url_base(),
        }
    }
}

/// Crawl window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Scheduling timezone (IANA name or `+HH:MM`)
    #[serde(default = "defaults::zone")]
    pub zone: String,

    /// Local hours closing each crawl window
    #[serde(default = "defaults::anchor_hours")]
    pub anchor_hours: Vec<u32>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            zone: defaults::zone(),
            anchor_hours: defaults::anchor_hours(),
        }
    }
}

/// HTTP client and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Attempts per request before giving up
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_attempts: defaults::max_attempts(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "defaults::gemini_base_url")]
    pub base_url: String,

    #[serde(default = "defaults::gemini_model")]
    pub model: String,

    /// Instruction prepended to every paper
    #[serde(default = "defaults::prompt")]
    pub prompt: String,

    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default = "defaults::summarizer_timeout")]
    pub timeout_secs: u64,

    /// Pause between summarization calls in milliseconds
    #[serde(default = "defaults::summarizer_delay")]
    pub delay_ms: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: defaults::gemini_base_url(),
            model: defaults::gemini_model(),
            prompt: defaults::prompt(),
            api_key: String::new(),
            timeout_secs: defaults::summarizer_timeout(),
            delay_ms: defaults::summarizer_delay(),
        }
    }
}

/// Digest delivery backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
    #[default]
    File,
    Webhook,
}

/// Digest delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub kind: NotifierKind,

    /// Directory receiving rendered digests (file backend)
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    /// Mail relay endpoint (webhook backend)
    #[serde(default)]
    pub webhook_url: String,

    #[serde(default = "defaults::sender")]
    pub sender: String,

    #[serde(default, deserialize_with = "deserialize_list")]
    pub recipients: Vec<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::default(),
            output_dir: defaults::output_dir(),
            webhook_url: String::new(),
            sender: defaults::sender(),
            recipients: Vec::new(),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accept either `"a, b"` or `["a", "b"]`.
fn deserialize_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ListVisitor;

    impl<'de> Visitor<'de> for ListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a comma-separated string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
            Ok(parse_list(v))
        }

        fn visit_seq<A: SeqAccess<'de>>(
            self,
            mut seq: A,
        ) -> std::result::Result<Self::Value, A::Error> {
            let mut out = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                out.extend(parse_list(&item));
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(ListVisitor)
}

mod defaults {
    // Feed defaults
    pub fn base_url() -> String {
        "https://oaipmh.arxiv.org/oai".into()
    }
    pub fn categories() -> Vec<String> {
        vec!["cs.AI".into(), "cs.CL".into(), "cs.LG".into()]
    }
    pub fn page_size() -> usize {
        100
    }
    pub fn metadata_prefix() -> String {
        "arXiv".into()
    }
    pub fn reference_zone() -> String {
        "UTC".into()
    }
    pub fn abs_url_base() -> String {
        "https://arxiv.org/abs/".into()
    }

    // Window defaults
    pub fn zone() -> String {
        "Asia/Shanghai".into()
    }
    pub fn anchor_hours() -> Vec<u32> {
        vec![10]
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "paper-digest/0.1 (arXiv daily digest)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        3000
    }
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        5000
    }

    // Summarizer defaults
    pub fn gemini_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".into()
    }
    pub fn gemini_model() -> String {
        "gemini-2.0-flash".into()
    }
    pub fn prompt() -> String {
        "Summarize the following paper in three sentences for a busy researcher.".into()
    }
    pub fn summarizer_timeout() -> u64 {
        60
    }
    pub fn summarizer_delay() -> u64 {
        4000
    }

    // Notifier defaults
    pub fn output_dir() -> String {
        "storage/digests".into()
    }
    pub fn sender() -> String {
        "paper-digest@localhost".into()
    }
}
