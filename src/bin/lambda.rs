//! AWS Lambda entry point for the listing watcher.
//!
//! Deploy with `cargo lambda build --release --features lambda` and attach
//! an EventBridge schedule (`rate(30 minutes)`).
//!
//! ## Environment Variables
//!
//! - `WEBHOOK_URL`: Slack incoming webhook (required)
//! - `STATE_BUCKET`: S3 bucket holding the known-id object (required)
//! - `STATE_KEY`: object key (default: `known_announcement_ids.json`)
//! - `SOURCE_URL`: listing page to watch
//! - `HTTP_TIMEOUT_SECS`: HTTP request timeout
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};

use listing_watch::lambda::handler;
use listing_watch::models::Config;
use listing_watch::pipeline::Monitor;
use listing_watch::storage::S3Store;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Listing watch Lambda starting...");

    // Missing configuration fails the cold start, not a single run.
    let config = Config::from_env()?;
    let store = S3Store::from_config(&config.storage).await;
    let monitor = Arc::new(Monitor::from_config(&config, Arc::new(store))?);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let monitor = Arc::clone(&monitor);
        async move { handler(event, &monitor).await }
    }))
    .await
}
