//! HTTP transport for header probes

pub mod client;
pub use client::HttpClient;
