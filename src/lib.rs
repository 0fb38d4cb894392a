// src/lib.rs

//! paper-digest: daily arXiv digest library

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
