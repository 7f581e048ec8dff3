// src/services/source.rs

//! Announcement source fetcher.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::SourceConfig;
use crate::utils::http;

/// Something that returns the raw listing document.
#[async_trait]
pub trait AnnouncementSource: Send + Sync {
    /// Fetch the raw body once. No retry.
    async fn fetch(&self) -> Result<String>;

    /// Where the body comes from, for logging.
    fn describe(&self) -> String;
}

/// Fetches the listing page over HTTP with a single GET.
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Build a source with its own client from configuration.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(Self::new(http::create_client(config)?, &config.url))
    }
}

#[async_trait]
impl AnnouncementSource for HttpSource {
    async fn fetch(&self) -> Result<String> {
        log::debug!("GET {}", self.url);
        let body = http::fetch_text(&self.client, &self.url).await?;
        log::debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_http_source_fetches_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/en/support/announcement/new-cryptocurrency-listing")
            .match_query(mockito::Matcher::UrlEncoded("c".into(), "48".into()))
            .with_status(200)
            .with_body("payload")
            .expect(1)
            .create_async()
            .await;

        let config = SourceConfig {
            url: format!(
                "{}/en/support/announcement/new-cryptocurrency-listing?c=48",
                server.url()
            ),
            ..SourceConfig::default()
        };
        let source = HttpSource::from_config(&config).unwrap();

        assert_eq!(source.fetch().await.unwrap(), "payload");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_source_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/").with_status(500).create_async().await;

        let config = SourceConfig {
            url: format!("{}/", server.url()),
            ..SourceConfig::default()
        };
        let source = HttpSource::from_config(&config).unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, AppError::Network { .. }));
    }
}
