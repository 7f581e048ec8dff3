// src/services/parser.rs

//! Listing page parser.
//!
//! The listing page embeds its data as JSON inside
//! `<script id="__APP_DATA">`. The public catalog API returns the same
//! article objects as bare JSON. Both are accepted.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Announcement, SourceConfig};
use crate::utils::resolve_url;

const APP_DATA_SELECTOR: &str = "script#__APP_DATA";

/// Turns a raw listing body into announcements.
#[derive(Debug, Clone)]
pub struct AnnouncementParser {
    announcement_base: Url,
    page_url: String,
}

impl AnnouncementParser {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            announcement_base: Url::parse(&config.announcement_base_url)?,
            page_url: config.url.clone(),
        })
    }

    /// Parse announcements, using the current time for entries without a release date.
    pub fn parse(&self, body: &str) -> Result<Vec<Announcement>> {
        self.parse_at(body, Utc::now())
    }

    /// Parse announcements observed at `observed_at`.
    ///
    /// Fails when the top-level document is missing or is not a listing
    /// envelope (an `appState` or `data` object). A recognised envelope
    /// without an article list yields an empty vector.
    pub fn parse_at(&self, body: &str, observed_at: DateTime<Utc>) -> Result<Vec<Announcement>> {
        let root = Self::document_json(body)?;
        check_envelope(&root)?;

        let Some(articles) = find_articles(&root) else {
            log::warn!("No article list found in listing data; structure may have changed");
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        let mut announcements = Vec::with_capacity(articles.len());
        for article in articles {
            match self.to_announcement(article, observed_at) {
                Some(item) => {
                    if seen.insert(item.id.clone()) {
                        announcements.push(item);
                    }
                }
                None => log::debug!("Skipping article without title: {article}"),
            }
        }

        Ok(announcements)
    }

    /// Extract the JSON document from an HTML page or a bare JSON body.
    fn document_json(body: &str) -> Result<Value> {
        let trimmed = body.trim_start();
        if trimmed.starts_with('{') {
            return serde_json::from_str(trimmed)
                .map_err(|e| AppError::parse(format!("listing JSON is malformed: {e}")));
        }

        let document = Html::parse_document(body);
        let selector = Selector::parse(APP_DATA_SELECTOR)
            .map_err(|e| AppError::parse(format!("invalid selector {APP_DATA_SELECTOR}: {e}")))?;

        let script = document
            .select(&selector)
            .next()
            .ok_or_else(|| AppError::parse("__APP_DATA script not found in listing page"))?;

        let text: String = script.text().collect();
        serde_json::from_str(text.trim())
            .map_err(|e| AppError::parse(format!("__APP_DATA is not valid JSON: {e}")))
    }

    fn to_announcement(&self, article: &Value, observed_at: DateTime<Utc>) -> Option<Announcement> {
        let title = article
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())?;

        let code = article
            .get("code")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let id = match code {
            Some(code) => code.to_string(),
            None => article
                .get("id")
                .and_then(scalar_string)
                .unwrap_or_else(|| Announcement::title_id(title)),
        };

        let link = match code {
            Some(code) => resolve_url(&self.announcement_base, code),
            None => self.page_url.clone(),
        };

        let published_at = article
            .get("releaseDate")
            .and_then(Value::as_i64)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(observed_at);

        Some(Announcement::new(id, title, link, published_at))
    }
}

/// Reject documents that are not a listing envelope, such as API error bodies.
fn check_envelope(root: &Value) -> Result<()> {
    let recognised = ["/appState", "/data"]
        .iter()
        .any(|pointer| root.pointer(pointer).is_some_and(Value::is_object));
    if recognised {
        return Ok(());
    }

    let message = root
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no appState or data object");
    let code = root.get("code").and_then(scalar_string).unwrap_or_default();
    Err(AppError::parse(format!(
        "listing document is not a listing envelope (code {code:?}): {message}"
    )))
}

/// Locate the article array in the known layouts.
fn find_articles(root: &Value) -> Option<Vec<&Value>> {
    if let Some(routes) = root
        .pointer("/appState/loader/dataByRouteId")
        .and_then(Value::as_object)
    {
        let found = routes.values().find_map(|route| {
            route
                .get("catalogDetail")
                .and_then(|detail| detail.get("articles"))
                .and_then(Value::as_array)
        });
        if let Some(articles) = found {
            return Some(articles.iter().collect());
        }
    }

    if let Some(catalogs) = root.pointer("/data/catalogs").and_then(Value::as_array) {
        let articles: Vec<&Value> = catalogs
            .iter()
            .filter_map(|catalog| catalog.get("articles").and_then(Value::as_array))
            .flatten()
            .collect();
        if !articles.is_empty() {
            return Some(articles);
        }
    }

    root.pointer("/data/articles")
        .and_then(Value::as_array)
        .map(|articles| articles.iter().collect())
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
