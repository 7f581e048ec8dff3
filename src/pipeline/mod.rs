//! Pipeline entry points.
//!
//! - `calculate_diff`: split parsed announcements into new and known
//! - `Monitor`: run one fetch, diff, notify, persist cycle

pub mod diff;
pub mod run;

pub use diff::{DiffResult, calculate_diff};
pub use run::{Monitor, Preview, RunReport, RunState, RunStatus};
