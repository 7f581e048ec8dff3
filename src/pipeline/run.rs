// src/pipeline/run.rs

//! One invocation of the watcher: fetch, parse, diff, notify, persist.
//!
//! Every step is awaited in sequence. Fetch, parse and load failures end
//! the run before anything is written. Notification failures are logged
//! per item and the run still persists the updated set.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::models::{Announcement, Config};
use crate::pipeline::diff::calculate_diff;
use crate::services::{
    AnnouncementParser, AnnouncementSource, HttpSource, Notifier, WebhookNotifier,
};
use crate::storage::StateStore;
use crate::utils::http;

/// Steps of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Parsing,
    Diffing,
    Notifying,
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Fetching => "fetching",
            RunState::Parsing => "parsing",
            RunState::Diffing => "diffing",
            RunState::Notifying => "notifying",
            RunState::Persisting => "persisting",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every new item was alerted
    Completed,
    /// At least one alert failed; identifiers were still persisted
    CompletedWithNotifyFailures,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    /// Announcements parsed from the source
    pub parsed: usize,
    /// Identifiers not seen before this run
    pub new_items: Vec<String>,
    /// Parsed announcements already in the known set
    pub already_known: usize,
    /// Alerts delivered
    pub notified: usize,
    /// Identifiers whose alert failed
    pub failed: Vec<String>,
    /// Size of the persisted set after the run
    pub known_total: usize,
    /// Zero announcements parsed from a non-empty body
    pub empty_result: bool,
}

impl RunReport {
    /// Log the report as a summary block.
    pub fn log_summary(&self) {
        log::info!("[SUMMARY] Listing watch run");
        log::info!("    status: {:?}", self.status);
        log::info!("    parsed: {}", self.parsed);
        log::info!("    new: {}", self.new_items.len());
        log::info!("    already known: {}", self.already_known);
        log::info!("    notified: {}", self.notified);
        if !self.failed.is_empty() {
            log::info!("    failed: {}", self.failed.join(", "));
        }
        log::info!("    known total: {}", self.known_total);
    }
}

/// Result of a dry run: what would be alerted.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub parsed: usize,
    pub new_items: Vec<Announcement>,
    pub known_total: usize,
    pub empty_result: bool,
}

/// Sequences the pipeline components for one invocation.
pub struct Monitor {
    source: Arc<dyn AnnouncementSource>,
    parser: AnnouncementParser,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
}

impl Monitor {
    pub fn new(
        config: &Config,
        source: Arc<dyn AnnouncementSource>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Ok(Self {
            source,
            parser: AnnouncementParser::new(&config.source)?,
            store,
            notifier,
        })
    }

    /// Wire the HTTP source and webhook notifier from configuration.
    pub fn from_config(config: &Config, store: Arc<dyn StateStore>) -> Result<Self> {
        let client = http::create_client(&config.source)?;
        let source = HttpSource::new(client.clone(), &config.source.url);
        let notifier = WebhookNotifier::new(client, config.notifier.clone());
        Self::new(config, Arc::new(source), store, Arc::new(notifier))
    }

    /// Run the full pipeline once.
    pub async fn run(&self) -> Result<RunReport> {
        let mut state = RunState::Idle;
        let result = self.run_steps(&mut state).await;

        if let Err(e) = &result {
            log::error!("Run failed while {}: {}", state, e);
            advance(&mut state, RunState::Failed);
        }
        result
    }

    async fn run_steps(&self, state: &mut RunState) -> Result<RunReport> {
        advance(state, RunState::Fetching);
        log::info!("Fetching listings from {}", self.source.describe());
        let body = self.source.fetch().await?;

        advance(state, RunState::Parsing);
        let (parsed, empty_result) = self.parse(&body)?;

        advance(state, RunState::Diffing);
        let known = self.store.load().await?;
        let diff = calculate_diff(&parsed, &known);
        let already_known = parsed.len() - diff.new_items.len();
        log::info!(
            "{} parsed, {} new, {} already known ({} ids stored)",
            parsed.len(),
            diff.new_items.len(),
            already_known,
            known.len()
        );

        advance(state, RunState::Notifying);
        let mut notified = 0;
        let mut failed = Vec::new();
        for item in &diff.new_items {
            log::info!("New listing: {} ({})", item.title, item.id);
            match self.notifier.notify(item).await {
                Ok(()) => notified += 1,
                Err(e) => {
                    log::warn!("Alert failed for {}: {}", item.id, e);
                    failed.push(item.id.clone());
                }
            }
        }

        advance(state, RunState::Persisting);
        if let Err(e) = self.store.save(&diff.updated_known).await {
            if notified > 0 {
                log::error!(
                    "{} alerts were sent but {} was not updated; they may repeat next run",
                    notified,
                    self.store.location()
                );
            }
            return Err(e);
        }

        advance(state, RunState::Done);
        let status = if failed.is_empty() {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithNotifyFailures
        };

        Ok(RunReport {
            status,
            parsed: parsed.len(),
            new_items: diff.new_items.iter().map(|item| item.id.clone()).collect(),
            already_known,
            notified,
            failed,
            known_total: diff.updated_known.len(),
            empty_result,
        })
    }

    /// Fetch, parse and diff without alerting or writing.
    pub async fn check(&self) -> Result<Preview> {
        let body = self.source.fetch().await?;
        let (parsed, empty_result) = self.parse(&body)?;
        let known = self.store.load().await?;
        let diff = calculate_diff(&parsed, &known);

        Ok(Preview {
            parsed: parsed.len(),
            new_items: diff.new_items,
            known_total: known.len(),
            empty_result,
        })
    }

    fn parse(&self, body: &str) -> Result<(Vec<Announcement>, bool)> {
        let parsed = self.parser.parse(body)?;
        let empty_result = parsed.is_empty() && !body.trim().is_empty();
        if empty_result {
            log::warn!(
                "Parsed zero announcements from a {} byte response; the page layout may have changed",
                body.len()
            );
        }
        Ok((parsed, empty_result))
    }
}

fn advance(state: &mut RunState, next: RunState) {
    log::debug!("Run state: {} -> {}", state, next);
    *state = next;
}
