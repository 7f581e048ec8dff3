//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Announcement source and HTTP behavior
    #[serde(default)]
    pub source: SourceConfig,

    /// Chat webhook settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Known-identifier object location
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Build configuration from the process environment and validate it.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_vars(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from a variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        if let Some(url) = get(&["WEBHOOK_URL", "SLACK_WEBHOOK_URL"]) {
            self.notifier.webhook_url = url;
        }
        if let Some(bucket) = get(&["STATE_BUCKET", "S3_BUCKET", "GCS_BUCKET_NAME"]) {
            self.storage.bucket = bucket;
        }
        if let Some(key) = get(&["STATE_KEY"]) {
            self.storage.object_key = key;
        }
        if let Some(url) = get(&["SOURCE_URL"]) {
            self.source.url = url;
        }
        if let Some(url) = get(&["ANNOUNCEMENT_BASE_URL"]) {
            self.source.announcement_base_url = url;
        }
        if let Some(timeout) = get(&["HTTP_TIMEOUT_SECS"]) {
            self.source.timeout_secs = timeout.parse().map_err(|_| {
                AppError::config(format!("HTTP_TIMEOUT_SECS is not a number: {timeout}"))
            })?;
        }
        if let Some(mention) = get(&["SLACK_MENTION"]) {
            self.notifier.mention = mention;
        }
        if let Some(blocks) = get(&["SLACK_BLOCKS"]) {
            self.notifier.blocks = matches!(blocks.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.notifier.webhook_url.trim().is_empty() {
            return Err(AppError::config("webhook URL is not set (WEBHOOK_URL)"));
        }
        Url::parse(&self.notifier.webhook_url)
            .map_err(|e| AppError::config(format!("webhook URL is invalid: {e}")))?;
        if self.storage.bucket.trim().is_empty() {
            return Err(AppError::config("state bucket is not set (STATE_BUCKET)"));
        }
        if self.storage.object_key.trim().is_empty() {
            return Err(AppError::config("storage.object_key is empty"));
        }
        Url::parse(&self.source.url)
            .map_err(|e| AppError::config(format!("source URL is invalid: {e}")))?;
        Url::parse(&self.source.announcement_base_url)
            .map_err(|e| AppError::config(format!("announcement base URL is invalid: {e}")))?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::config("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::config("source.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Announcement source and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Listing page (or API endpoint) to fetch
    #[serde(default = "defaults::source_url")]
    pub url: String,

    /// Base that announcement slugs are joined onto
    #[serde(default = "defaults::announcement_base_url")]
    pub announcement_base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
            announcement_base_url: defaults::announcement_base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Webhook notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Incoming webhook URL (secret)
    #[serde(default)]
    pub webhook_url: String,

    /// Mention prepended to the fallback text, e.g. `<!here>`
    #[serde(default = "defaults::mention")]
    pub mention: String,

    /// Headline of every alert
    #[serde(default = "defaults::headline")]
    pub headline: String,

    /// Body template rendered with `Announcement::format`
    #[serde(default = "defaults::template")]
    pub template: String,

    /// Attach Slack Block Kit blocks to the payload
    #[serde(default = "defaults::blocks")]
    pub blocks: bool,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            mention: defaults::mention(),
            headline: defaults::headline(),
            template: defaults::template(),
            blocks: defaults::blocks(),
        }
    }
}

/// Known-identifier object location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket (or local directory name) holding the object
    #[serde(default)]
    pub bucket: String,

    /// Object key of the identifier list
    #[serde(default = "defaults::object_key")]
    pub object_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            object_key: defaults::object_key(),
        }
    }
}

mod defaults {
    pub fn source_url() -> String {
        "https://www.binance.com/en/support/announcement/new-cryptocurrency-listing?c=48".into()
    }
    pub fn announcement_base_url() -> String {
        "https://www.binance.com/en/support/announcement/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn mention() -> String {
        "<!here>".into()
    }
    pub fn headline() -> String {
        "New Binance Listing Alert! 🚨".into()
    }
    pub fn template() -> String {
        "{title}\n{link}".into()
    }
    pub fn blocks() -> bool {
        true
    }
    pub fn object_key() -> String {
        "known_announcement_ids.json".into()
    }
}
