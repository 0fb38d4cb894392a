// src/models/mod.rs

//! Domain models for the digest application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod category;
mod config;
mod paper;
mod window;

// Re-export all public types
pub use category::CategoryQuery;
pub use config::{
    Config, CrawlerConfig, FeedConfig, FeedProtocol, NotifierConfig, NotifierKind,
    SummarizerConfig, WindowConfig,
};
pub use paper::{Paper, RawRecord};
pub use window::{TimeWindow, Zone};
