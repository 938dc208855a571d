//! headersec - HTTP security header scanner
//!
//! Fetches response headers from a batch of targets under a concurrency limit
//! and classifies them against static tables of recommended,
//! information-leaking, and deprecated headers. Results are printed as an
//! annotated tree or written as JSON.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod report;
pub mod scanner;
