//! Service layer for the digest application.
//!
//! This module contains the business logic for:
//! - Crawl window computation (`TimeWindowCalculator`)
//! - Category addressing (`CategorySetMapper`)
//! - Feed access with retry (`FeedClient`, `FeedSource`)
//! - Page parsing (`RecordParser`) and pagination (`PaginationWalker`)
//! - Deduplication (`MergedIndex`)
//! - Summaries (`Summarizer`) and delivery (`Notifier`)

pub mod categories;
pub mod feed_client;
pub mod merge;
pub mod notifier;
pub mod parser;
pub mod sources;
pub mod summarizer;
pub mod walker;
pub mod window;

pub use categories::CategorySetMapper;
pub use feed_client::{FeedClient, FeedResponse};
pub use merge::MergedIndex;
pub use notifier::{
    DeliveryReport, Digest, DigestComposer, FileNotifier, Notifier, WebhookNotifier,
    build_notifier,
};
pub use parser::{ParsedPage, RecordParser};
pub use sources::{
    FeedSource, ListingSource, OaiPmhSource, PageCursor, Pagination, QuerySource, build_source,
};
pub use summarizer::{GeminiSummarizer, Summarizer, summarize_papers};
pub use walker::{PaginationWalker, WalkState, next_state};
pub use window::TimeWindowCalculator;
