// src/models/mod.rs

//! Domain models for the listing watcher.

mod announcement;
mod config;
mod message;

// Re-export all public types
pub use announcement::{Announcement, KnownIds};
pub use config::{Config, NotifierConfig, SourceConfig, StorageConfig};
pub use message::WebhookMessage;
