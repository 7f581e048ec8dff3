// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &SourceConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a URL and return its body as text.
///
/// Transport errors and non-2xx statuses are reported as network errors.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::network(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::network(url, format!("HTTP status {status}")));
    }

    response.text().await.map_err(|e| AppError::network(url, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_text_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/listing")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let client = create_client(&SourceConfig::default()).unwrap();
        let body = fetch_text(&client, &format!("{}/listing", server.url()))
            .await
            .unwrap();

        assert_eq!(body, "<html></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_text_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/listing")
            .with_status(403)
            .create_async()
            .await;

        let client = create_client(&SourceConfig::default()).unwrap();
        let err = fetch_text(&client, &format!("{}/listing", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Network { .. }));
        assert!(err.to_string().contains("403"));
    }
}
