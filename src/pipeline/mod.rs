//! Pipeline entry points for digest operations.
//!
//! - `run_crawler`: Fetch the current window's papers from the feed
//! - `run_digest`: Crawl, summarize and deliver one digest

pub mod crawl;
pub mod digest;

pub use crawl::{CrawlOrchestrator, run_crawler};
pub use digest::{DigestOutcome, run_digest, run_digest_with};
