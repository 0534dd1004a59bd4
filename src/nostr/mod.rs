// Nostr cache service module.
// Provides the HTTP client, request shapes, and event types for the article feed.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::CacheClient;
pub use endpoints::{CacheRequest, Filter};
pub use types::*;
