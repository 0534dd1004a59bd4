// Article data loader.
// Fetches the event set, normalizes it into posts and profiles, and retries empty loads.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::nostr::{CacheClient, CacheRequest, PROFILE_KIND, Post, ProfileIndex};

/// Something that can produce a raw cache response.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch(&self) -> Result<Value>;
}

/// The cache service queried with one fixed request.
#[derive(Debug, Clone)]
pub struct CacheQuery {
    client: CacheClient,
    request: CacheRequest,
}

impl CacheQuery {
    pub fn new(client: CacheClient, request: CacheRequest) -> Self {
        Self { client, request }
    }
}

#[async_trait]
impl EventSource for CacheQuery {
    async fn fetch(&self) -> Result<Value> {
        self.client.fetch(&self.request).await
    }
}

/// Response body didn't have the expected layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("response is not a JSON object")]
    NotAnObject,
    #[error("response has no `events` array")]
    MissingEvents,
    #[error("response has no `profiles` object")]
    MissingProfiles,
}

/// Normalized article data plus the most recent load failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub posts: Vec<Post>,
    pub profiles: ProfileIndex,
    pub last_error: Option<String>,
}

/// How many times to retry an empty load, and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            delay: Duration::from_secs(4),
        }
    }
}

/// Result of a full retry sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub posts: usize,
    pub attempts: u32,
}

/// Everything a finished load task hands back to the app.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub feed: Feed,
    pub summary: LoadSummary,
}

pub struct DataLoader<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: EventSource> DataLoader<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch once and replace the feed on success.
    ///
    /// Never fails: transport and shape errors are logged, recorded in
    /// `feed.last_error`, and reported as zero posts with the feed's posts
    /// and profiles left as they were.
    pub async fn load(&self, feed: &mut Feed) -> usize {
        let body = match self.source.fetch().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to fetch articles");
                feed.last_error = Some(e.to_string());
                return 0;
            }
        };

        match normalize(body) {
            Ok((posts, profiles)) => {
                let count = posts.len();
                feed.posts = posts;
                feed.profiles = profiles;
                feed.last_error = None;
                count
            }
            Err(e) => {
                warn!(error = %e, "unexpected cache response");
                feed.last_error = Some(e.to_string());
                0
            }
        }
    }

    /// Load, retrying after `policy.delay` while the result stays empty.
    pub async fn load_with_retry(&self, feed: &mut Feed) -> LoadSummary {
        let mut attempts = 0;
        loop {
            attempts += 1;
            info!(attempt = attempts, "loading articles");
            let posts = self.load(feed).await;

            if posts > 0 || attempts > self.policy.retries {
                info!(posts, attempts, "article load finished");
                return LoadSummary { posts, attempts };
            }

            debug!(delay = ?self.policy.delay, "empty load, retrying");
            tokio::time::sleep(self.policy.delay).await;
        }
    }

    /// Run a full retry sequence into a fresh feed.
    pub async fn run(&self) -> LoadOutcome {
        let mut feed = Feed::default();
        let summary = self.load_with_retry(&mut feed).await;
        LoadOutcome { feed, summary }
    }
}

/// Split a cache response into posts and a profile index.
///
/// Individual records that fail to decode are skipped.
pub fn normalize(body: Value) -> std::result::Result<(Vec<Post>, ProfileIndex), ShapeError> {
    let Value::Object(mut body) = body else {
        return Err(ShapeError::NotAnObject);
    };

    let Some(Value::Array(events)) = body.remove("events") else {
        return Err(ShapeError::MissingEvents);
    };
    let Some(Value::Object(profiles)) = body.remove("profiles") else {
        return Err(ShapeError::MissingProfiles);
    };

    let posts = events
        .into_iter()
        .filter_map(|event| match serde_json::from_value::<Post>(event) {
            Ok(post) => Some(post),
            Err(e) => {
                debug!(error = %e, "skipping malformed event");
                None
            }
        })
        .collect();

    let profiles = profiles
        .into_iter()
        .filter_map(|(pubkey, record)| match serde_json::from_value::<Post>(record) {
            Ok(record) => {
                if record.kind != PROFILE_KIND {
                    debug!(%pubkey, kind = record.kind, "profile record has unexpected kind");
                }
                Some((pubkey, record))
            }
            Err(e) => {
                debug!(%pubkey, error = %e, "skipping malformed profile");
                None
            }
        })
        .collect();

    Ok((posts, profiles))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::LongreadError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;
    use tokio::time::Instant;

    /// One scripted reply from [`ScriptedSource`].
    pub(crate) enum Reply {
        Body(Value),
        Fail(&'static str),
    }

    #[derive(Default)]
    struct Script {
        replies: VecDeque<Reply>,
        calls: Vec<Instant>,
    }

    /// Event source replaying canned replies, then empty responses.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedSource {
        script: Arc<Mutex<Script>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(replies: Vec<Reply>) -> Self {
            Self {
                script: Arc::new(Mutex::new(Script {
                    replies: replies.into(),
                    calls: Vec::new(),
                })),
            }
        }

        pub(crate) fn calls(&self) -> Vec<Instant> {
            self.script.lock().unwrap().calls.clone()
        }
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        async fn fetch(&self) -> Result<Value> {
            let mut script = self.script.lock().unwrap();
            script.calls.push(Instant::now());
            match script.replies.pop_front() {
                Some(Reply::Body(body)) => Ok(body),
                Some(Reply::Fail(msg)) => Err(LongreadError::Other(msg.to_string())),
                None => Ok(empty_response()),
            }
        }
    }

    pub(crate) fn empty_response() -> Value {
        json!({ "events": [], "profiles": {} })
    }

    pub(crate) fn alice_response() -> Value {
        json!({
            "events": [{ "id": "1", "pubkey": "p1", "kind": 30023, "content": "# Hi" }],
            "profiles": {
                "p1": {
                    "id": "p1",
                    "pubkey": "p1",
                    "kind": PROFILE_KIND,
                    "content": "{\"name\":\"Alice\",\"picture\":\"http://x/a.png\"}"
                }
            }
        })
    }

    fn scripted_loader(replies: Vec<Reply>) -> DataLoader<ScriptedSource> {
        DataLoader::new(ScriptedSource::new(replies), RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_load_success() {
        let loader = scripted_loader(vec![Reply::Body(alice_response())]);
        let mut feed = Feed::default();

        assert_eq!(loader.load(&mut feed).await, 1);
        assert_eq!(feed.posts[0].id, "1");
        assert_eq!(feed.profiles["p1"].metadata().display_name(), Some("Alice"));
        assert!(feed.last_error.is_none());
    }

    #[tokio::test]
    async fn test_load_bad_events_returns_zero() {
        let bodies = [
            json!({ "profiles": {} }),
            json!({ "events": "nope", "profiles": {} }),
            json!({ "events": { "1": {} }, "profiles": {} }),
            json!({ "events": [], "profiles": [] }),
            json!([1, 2, 3]),
            json!(null),
        ];

        for body in bodies {
            let loader = scripted_loader(vec![Reply::Body(alice_response()), Reply::Body(body.clone())]);
            let mut feed = Feed::default();
            assert_eq!(loader.load(&mut feed).await, 1);
            let before = feed.clone();

            assert_eq!(loader.load(&mut feed).await, 0, "{body}");
            assert_eq!(feed.posts, before.posts);
            assert_eq!(feed.profiles, before.profiles);
            assert!(feed.last_error.is_some());
        }
    }

    #[tokio::test]
    async fn test_load_transport_error_returns_zero() {
        let loader = scripted_loader(vec![Reply::Fail("connection refused")]);
        let mut feed = Feed::default();

        assert_eq!(loader.load(&mut feed).await, 0);
        assert!(feed.posts.is_empty());
        assert_eq!(feed.last_error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_load_replaces_profiles_entirely() {
        let second = json!({
            "events": [{ "id": "2", "pubkey": "p2", "kind": 30023, "content": "" }],
            "profiles": { "p2": { "id": "p2", "pubkey": "p2", "kind": PROFILE_KIND, "content": "{}" } }
        });
        let loader = scripted_loader(vec![Reply::Body(alice_response()), Reply::Body(second)]);
        let mut feed = Feed::default();

        loader.load(&mut feed).await;
        loader.load(&mut feed).await;

        assert_eq!(feed.posts.len(), 1);
        assert_eq!(feed.posts[0].id, "2");
        assert!(!feed.profiles.contains_key("p1"));
        assert!(feed.profiles.contains_key("p2"));
    }

    #[test]
    fn test_normalize_skips_malformed_records() {
        let body = json!({
            "events": [
                { "id": "1", "pubkey": "p1", "kind": 30023, "content": "ok" },
                { "id": "2", "kind": "not a number" },
                "garbage"
            ],
            "profiles": {
                "p1": { "id": "p1", "pubkey": "p1", "kind": PROFILE_KIND, "content": "not json" },
                "p2": 7
            }
        });

        let (posts, profiles) = normalize(body).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(profiles.len(), 1);
        assert!(profiles["p1"].metadata().display_name().is_none());
    }

    #[test]
    fn test_normalize_shape_errors() {
        assert_eq!(normalize(json!("x")), Err(ShapeError::NotAnObject));
        assert_eq!(normalize(json!({})), Err(ShapeError::MissingEvents));
        assert_eq!(
            normalize(json!({ "events": [] })),
            Err(ShapeError::MissingProfiles)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_bound_on_empty_loads() {
        let source = ScriptedSource::new(vec![]);
        let loader = DataLoader::new(source.clone(), RetryPolicy::default());
        let mut feed = Feed::default();

        let summary = loader.load_with_retry(&mut feed).await;

        assert_eq!(summary, LoadSummary { posts: 0, attempts: 2 });
        let calls = source.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1] - calls[0] >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_stops_on_first_nonempty_load() {
        let source = ScriptedSource::new(vec![Reply::Body(alice_response())]);
        let loader = DataLoader::new(source.clone(), RetryPolicy::default());
        let mut feed = Feed::default();

        let summary = loader.load_with_retry(&mut feed).await;

        assert_eq!(summary, LoadSummary { posts: 1, attempts: 1 });
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_failure_then_success() {
        let loader = scripted_loader(vec![Reply::Fail("timeout"), Reply::Body(alice_response())]);
        let mut feed = Feed::default();

        let summary = loader.load_with_retry(&mut feed).await;

        assert_eq!(summary, LoadSummary { posts: 1, attempts: 2 });
        assert!(feed.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_full_delay_before_second_attempt() {
        let source = ScriptedSource::new(vec![]);
        let loader = DataLoader::new(source.clone(), RetryPolicy::default());
        let task = tokio::spawn(async move { loader.run().await });

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(source.calls().len(), 1);
        assert!(!task.is_finished());

        let outcome = task.await.unwrap();
        assert_eq!(outcome.summary.attempts, 2);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy() {
        let policy = RetryPolicy {
            retries: 3,
            delay: Duration::from_millis(250),
        };
        let loader = DataLoader::new(ScriptedSource::new(vec![]), policy);
        let mut feed = Feed::default();

        let summary = loader.load_with_retry(&mut feed).await;

        assert_eq!(summary.attempts, 4);
        assert_eq!(loader.policy(), policy);
    }

    /// Answer one HTTP request with a canned response; yields the request line.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (CacheClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        let client = CacheClient::new(&format!("http://{}", addr)).unwrap();
        (client, handle)
    }

    fn cache_id_loader(client: CacheClient, cache_id: &str) -> DataLoader<CacheQuery> {
        let request = CacheRequest::ByCacheId {
            cache_id: cache_id.to_string(),
        };
        DataLoader::new(CacheQuery::new(client, request), RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_cache_id_request_line() {
        let (client, server) = serve_once("200 OK", r#"{"events":[],"profiles":{}}"#).await;

        let body = client.fetch_by_cache_id("abc").await.unwrap();

        assert_eq!(body, empty_response());
        assert_eq!(server.await.unwrap(), "GET /fetch?cache_id=abc HTTP/1.1");
    }

    #[tokio::test]
    async fn test_http_error_status_is_a_status_error() {
        let (client, server) = serve_once("500 Internal Server Error", "oops").await;

        let err = client.fetch_by_cache_id("abc").await.unwrap_err();

        assert!(
            matches!(err, LongreadError::Status { status: 500, ref body } if body == "oops"),
            "{err}"
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_json_error() {
        let (client, server) = serve_once("200 OK", "not json").await;

        let err = client.fetch_by_cache_id("abc").await.unwrap_err();

        assert!(matches!(err, LongreadError::Json(_)), "{err}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_load_from_failing_server_returns_zero() {
        for (status, body) in [("500 Internal Server Error", "oops"), ("200 OK", "not json")] {
            let (client, server) = serve_once(status, body).await;
            let loader = cache_id_loader(client, "abc");
            let mut feed = Feed::default();

            assert_eq!(loader.load(&mut feed).await, 0, "{status}");
            assert!(feed.posts.is_empty());
            assert!(feed.last_error.is_some());
            assert_eq!(server.await.unwrap(), "GET /fetch?cache_id=abc HTTP/1.1");
        }
    }

    #[tokio::test]
    async fn test_load_from_server_decodes_articles() {
        let body = r##"{"events":[{"id":"1","pubkey":"p1","kind":30023,"content":"# Hi"}],"profiles":{}}"##;
        let (client, server) = serve_once("200 OK", body).await;
        let loader = cache_id_loader(client, "abc");
        let mut feed = Feed::default();

        assert_eq!(loader.load(&mut feed).await, 1);
        assert_eq!(feed.posts[0].id, "1");
        server.await.unwrap();
    }
}
