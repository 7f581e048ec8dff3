//! Service layer for the listing watcher.
//!
//! - Listing page fetching (`HttpSource`)
//! - Announcement extraction (`AnnouncementParser`)
//! - Alert delivery (`WebhookNotifier`)

mod notifier;
mod parser;
mod source;

pub use notifier::{Notifier, WebhookNotifier};
pub use parser::AnnouncementParser;
pub use source::{AnnouncementSource, HttpSource};
