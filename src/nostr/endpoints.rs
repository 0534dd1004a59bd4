// Cache service endpoint functions.
// Provides the two request shapes the cache server accepts for article sets.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

use super::client::CacheClient;

const FETCH_ENDPOINT: &str = "/fetch";
const CACHE_ENDPOINT: &str = "/cache";

/// Author/kind filter sent with a cache request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub authors: Vec<String>,
    pub kinds: Vec<u32>,
}

/// Body of a `POST /cache` request.
#[derive(Debug, Serialize)]
struct CacheRequestBody<'a> {
    filter: &'a Filter,
    relays: &'a [String],
}

/// Which cache endpoint to query, and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRequest {
    /// `GET /fetch?cache_id=..` for a server-side prepared cache.
    ByCacheId { cache_id: String },
    /// `POST /cache` with an explicit filter and relay list.
    ByFilter { filter: Filter, relays: Vec<String> },
}

impl CacheClient {
    /// Fetch a prepared event set by cache id.
    pub async fn fetch_by_cache_id(&self, cache_id: &str) -> Result<Value> {
        self.get_json(FETCH_ENDPOINT, &[("cache_id", cache_id)]).await
    }

    /// Ask the server to gather events matching a filter from the given relays.
    pub async fn fetch_by_filter(&self, filter: &Filter, relays: &[String]) -> Result<Value> {
        let body = CacheRequestBody { filter, relays };
        self.post_json(CACHE_ENDPOINT, &body).await
    }

    /// Run a cache request.
    pub async fn fetch(&self, request: &CacheRequest) -> Result<Value> {
        match request {
            CacheRequest::ByCacheId { cache_id } => self.fetch_by_cache_id(cache_id).await,
            CacheRequest::ByFilter { filter, relays } => {
                self.fetch_by_filter(filter, relays).await
            }
        }
    }
}
