// src/lambda/mod.rs

//! AWS Lambda handler for the listing watcher.
//!
//! Invoked by an EventBridge schedule every 30 minutes. Each invocation:
//! 1. Fetches and parses the listing page
//! 2. Diffs it against the known-id object in S3
//! 3. Posts an alert per new announcement
//! 4. Writes the updated known-id object back

use std::time::Instant;

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::error::AppError;
use crate::pipeline::{Monitor, RunReport};

/// Lambda invocation payload. Scheduler events carry no relevant fields.
#[derive(Debug, Default, Deserialize)]
pub struct InvocationRequest {
    /// Report new announcements without alerting or writing state
    #[serde(default)]
    pub dry_run: bool,
}

impl InvocationRequest {
    /// Read the request from any event payload, falling back to defaults.
    ///
    /// A payload whose known fields have the wrong type is logged and
    /// treated as a normal run.
    pub fn from_payload(payload: Value) -> Self {
        match serde_json::from_value(payload) {
            Ok(request) => request,
            Err(e) => {
                warn!("Ignoring invalid invocation payload, running with defaults: {}", e);
                Self::default()
            }
        }
    }
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct InvocationResponse {
    /// Whether the run finished without a terminal error
    pub success: bool,

    #[serde(flatten)]
    pub report: Option<RunReport>,

    /// Identifiers a dry run would have alerted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_notify: Option<Vec<String>>,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Failure class, e.g. `network_failure`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl InvocationResponse {
    fn failed(err: &AppError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            error_kind: Some(err.kind().to_string()),
            ..Default::default()
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event, monitor))]
pub async fn handler(
    event: LambdaEvent<Value>,
    monitor: &Monitor,
) -> std::result::Result<InvocationResponse, LambdaError> {
    let start = Instant::now();
    let (payload, context) = event.into_parts();
    let request = InvocationRequest::from_payload(payload);

    info!(
        "Starting listing watch: request_id={}, dry_run={}",
        context.request_id, request.dry_run
    );

    let mut response = if request.dry_run {
        match monitor.check().await {
            Ok(preview) => InvocationResponse {
                success: true,
                would_notify: Some(preview.new_items.into_iter().map(|a| a.id).collect()),
                ..Default::default()
            },
            Err(e) => {
                error!("Dry run failed: {}", e);
                InvocationResponse::failed(&e)
            }
        }
    } else {
        match monitor.run().await {
            Ok(report) => {
                report.log_summary();
                InvocationResponse {
                    success: true,
                    report: Some(report),
                    ..Default::default()
                }
            }
            Err(e) => {
                error!("Listing watch failed: {}", e);
                InvocationResponse::failed(&e)
            }
        }
    };

    response.execution_time_ms = start.elapsed().as_millis() as u64;
    info!(
        "Listing watch finished: success={} in {}ms",
        response.success, response.execution_time_ms
    );
    Ok(response)
}
