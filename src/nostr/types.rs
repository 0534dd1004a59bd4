// Nostr event and profile types.
// Defines the records served by the cache service and fail-soft metadata decoding.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event kind for long-form articles (NIP-23).
pub const ARTICLE_KIND: u32 = 30023;

/// Event kind for profile metadata (NIP-01).
pub const PROFILE_KIND: u32 = 0;

/// A Nostr event as returned by the cache service.
///
/// Articles carry markdown in `content`; profile records carry a JSON
/// encoded [`Metadata`] blob instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub pubkey: String,
    pub kind: u32,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
}

impl Post {
    /// Whether this event is a displayable long-form article.
    pub fn is_article(&self) -> bool {
        self.kind == ARTICLE_KIND
    }

    /// First value of the named tag, if present.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.first().is_some_and(|t| t == name))
            .and_then(|tag| tag.get(1))
            .map(String::as_str)
    }

    /// Article title from the `title` tag.
    pub fn title(&self) -> Option<&str> {
        self.tag_value("title").filter(|t| !t.trim().is_empty())
    }

    /// Article summary from the `summary` tag.
    pub fn summary(&self) -> Option<&str> {
        self.tag_value("summary").filter(|s| !s.trim().is_empty())
    }

    /// Publication time: `published_at` tag, falling back to `created_at`.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.tag_value("published_at")
            .and_then(|v| v.parse::<i64>().ok())
            .or(self.created_at)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Decode this record's content as profile metadata.
    pub fn metadata(&self) -> Metadata {
        Metadata::from_content(&self.content)
    }
}

/// Author display metadata decoded from a profile record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl Metadata {
    /// Parse metadata JSON. Anything undecodable yields empty metadata.
    pub fn from_content(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_default()
    }

    /// Display name, ignoring empty strings.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Avatar URL, ignoring empty strings.
    pub fn picture_url(&self) -> Option<&str> {
        self.picture.as_deref().filter(|p| !p.is_empty())
    }
}

/// Profile records keyed by author pubkey.
pub type ProfileIndex = HashMap<String, Post>;
