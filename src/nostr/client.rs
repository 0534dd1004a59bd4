// Cache service HTTP client.
// Builds requests against the cache server and converts HTTP failures into errors.

use std::time::Duration;

use reqwest::{
    Client, Response,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{LongreadError, Result};

/// Upper bound on a single request, so a stalled server counts as a failed load.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client bound to one cache server.
#[derive(Debug, Clone)]
pub struct CacheClient {
    client: Client,
    server: String,
}

impl CacheClient {
    /// Create a client for the given server base URL.
    pub fn new(server: &str) -> Result<Self> {
        Self::with_timeout(server, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("longread/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(LongreadError::Http)?;

        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
        })
    }

    /// The server base URL, without a trailing slash.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Full URL for an endpoint path.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.server, endpoint)
    }

    /// Make a GET request with query parameters and decode the JSON body.
    pub async fn get_json<T: Serialize + ?Sized>(&self, endpoint: &str, params: &T) -> Result<Value> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(params)
            .send()
            .await
            .map_err(LongreadError::Http)?;

        Self::decode(response).await
    }

    /// Make a POST request with a JSON body and decode the JSON response.
    pub async fn post_json<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Value> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(LongreadError::Http)?;

        Self::decode(response).await
    }

    /// Check the status and parse the body as JSON.
    async fn decode(response: Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LongreadError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Shorten an error body for logging.
fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_url_strips_trailing_slash() {
        let client = CacheClient::new("https://api.example.dev/").unwrap();
        assert_eq!(client.server(), "https://api.example.dev");
        assert_eq!(client.url("/fetch"), "https://api.example.dev/fetch");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
        assert_eq!(truncate("ééééé", 2), "éé…");
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            // Hold the connection open without answering.
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client =
            CacheClient::with_timeout(&format!("http://{}", addr), Duration::from_millis(200))
                .unwrap();
        let err = client.get_json("/fetch", &[("cache_id", "abc")]).await.unwrap_err();

        assert!(matches!(err, LongreadError::Http(ref e) if e.is_timeout()), "{err}");
        server.abort();
    }
}
