// Application configuration.
// Loads config.toml from the platform config directory and applies CLI overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{LongreadError, Result};
use crate::loader::RetryPolicy;
use crate::nostr::{ARTICLE_KIND, CacheRequest, Filter};

pub const DEFAULT_SERVER: &str = "https://api.huddlers.dev";
pub const DEFAULT_CACHE_ID: &str =
    "7b77238f38a661f30de9584dbbdd4e9144a4bc860151181cc4533fce6de9b565";
pub const DEFAULT_RELAY: &str = "wss://relay.primal.net";
pub const DEFAULT_PLACEHOLDER_AVATAR: &str = "https://yt3.ggpht.com/a/AATXAJy95ke01msPUiPiieinGX3qX7BDR5ozsqHXNQ=s900-c-k-c0xffffffff-no-rj-mo";

const DEFAULT_AUTHORS: [&str; 6] = [
    "82341f882b6eabcd2ba7f1ef90aad961cf074af15b9ef44a09f9d2a8fbfbe6a2",
    "04c915daefee38317fa734444acee390a8269fe5810b2241e5e6dd343dfbecc9",
    "b708f7392f588406212c3882e7b3bc0d9b08d62f95fa170d099127ece2770e5e",
    "50d94fc2d8580c682b071a542f8b1e31a200b0508bab95a33bef0855df281d63",
    "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d",
    "fa984bd7dbb282f07e16e7ae87b26a2a7b9b90b7246a44771f0cf5ae58018f52",
];

/// Which cache endpoint the loader queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// GET a server-prepared event set by cache id.
    #[default]
    CacheId,
    /// POST an author/kind filter and relay list.
    Filter,
}

/// Filter settings used by [`FetchStrategy::Filter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_authors")]
    pub authors: Vec<String>,
    #[serde(default = "default_kinds")]
    pub kinds: Vec<u32>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            authors: default_authors(),
            kinds: default_kinds(),
        }
    }
}

/// Retry settings for empty loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            delay_secs: default_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default)]
    pub strategy: FetchStrategy,
    #[serde(default = "default_cache_id")]
    pub cache_id: String,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default = "default_relays")]
    pub relays: Vec<String>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default = "default_placeholder_avatar")]
    pub placeholder_avatar: String,
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

fn default_cache_id() -> String {
    DEFAULT_CACHE_ID.to_string()
}

fn default_authors() -> Vec<String> {
    DEFAULT_AUTHORS.iter().map(|a| a.to_string()).collect()
}

fn default_kinds() -> Vec<u32> {
    vec![ARTICLE_KIND]
}

fn default_relays() -> Vec<String> {
    vec![DEFAULT_RELAY.to_string()]
}

fn default_retries() -> u32 {
    1
}

fn default_delay_secs() -> u64 {
    4
}

fn default_placeholder_avatar() -> String {
    DEFAULT_PLACEHOLDER_AVATAR.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: default_server(),
            strategy: FetchStrategy::default(),
            cache_id: default_cache_id(),
            filter: FilterConfig::default(),
            relays: default_relays(),
            retry: RetryConfig::default(),
            placeholder_avatar: default_placeholder_avatar(),
        }
    }
}

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub cache_id: Option<String>,
    pub strategy: Option<FetchStrategy>,
}

impl AppConfig {
    /// Load from the default location, or defaults if no file exists.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(AppConfig::default()),
        }
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply command line overrides.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(server) = overrides.server {
            self.server = server;
        }
        if let Some(cache_id) = overrides.cache_id {
            self.cache_id = cache_id;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        self
    }

    /// Reject configurations the loader cannot use.
    pub fn validate(&self) -> Result<()> {
        let server = self.server.trim();
        if server.is_empty() {
            return Err(LongreadError::InvalidConfig("server must not be empty".into()));
        }
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(LongreadError::InvalidConfig(format!(
                "server must be an http(s) URL, got {:?}",
                server
            )));
        }
        match self.strategy {
            FetchStrategy::CacheId if self.cache_id.trim().is_empty() => Err(
                LongreadError::InvalidConfig("cache_id must be set for the cache_id strategy".into()),
            ),
            FetchStrategy::Filter if self.filter.authors.is_empty() => Err(
                LongreadError::InvalidConfig("filter.authors must not be empty".into()),
            ),
            _ => Ok(()),
        }
    }

    /// Build the cache request for the configured strategy.
    pub fn cache_request(&self) -> CacheRequest {
        match self.strategy {
            FetchStrategy::CacheId => CacheRequest::ByCacheId {
                cache_id: self.cache_id.clone(),
            },
            FetchStrategy::Filter => CacheRequest::ByFilter {
                filter: Filter {
                    authors: self.filter.authors.clone(),
                    kinds: self.filter.kinds.clone(),
                },
                relays: self.relays.clone(),
            },
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retry.retries,
            delay: Duration::from_secs(self.retry.delay_secs),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "longread")
}

/// Path to config.toml (~/.config/longread on Linux).
pub fn config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Directory for the log file.
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}
