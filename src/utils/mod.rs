//! Utility functions and helpers.

pub mod http;
pub mod retry;
pub mod text;

pub use retry::{Pacer, RetryPolicy};
