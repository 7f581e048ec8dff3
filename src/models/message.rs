//! Webhook payload built from an announcement.

use serde::Serialize;
use serde_json::{Value, json};

use crate::models::{Announcement, NotifierConfig};

/// JSON body posted to a Slack-compatible incoming webhook.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookMessage {
    /// Fallback and push-notification text
    pub text: String,

    /// Block Kit layout
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Value>,
}

impl WebhookMessage {
    /// Build the alert for a single announcement.
    pub fn for_announcement(item: &Announcement, config: &NotifierConfig) -> Self {
        let lead = if config.mention.is_empty() {
            config.headline.clone()
        } else {
            format!("{} {}", config.mention, config.headline)
        };
        let text = format!("{}\n{}", lead, item.format(&config.template));

        let blocks = if config.blocks {
            Self::blocks(item, &config.headline)
        } else {
            Vec::new()
        };

        Self { text, blocks }
    }

    fn blocks(item: &Announcement, headline: &str) -> Vec<Value> {
        let mut fields = vec![
            json!({ "type": "mrkdwn", "text": format!("*Time:*\n{}", item.published_display()) }),
            json!({ "type": "mrkdwn", "text": format!("*ID:*\n{}", item.id) }),
        ];
        let symbols = item.symbols();
        if !symbols.is_empty() {
            fields.push(json!({
                "type": "mrkdwn",
                "text": format!("*Symbols:*\n{}", symbols.join(", "))
            }));
        }

        vec![
            json!({
                "type": "header",
                "text": { "type": "plain_text", "text": headline, "emoji": true }
            }),
            json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("*{}*", item.title) }
            }),
            json!({ "type": "section", "fields": fields }),
            json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!("<{}|Click here to view the announcement> 🔗", item.link)
                }
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item() -> Announcement {
        Announcement::new(
            "binance-will-list-foo-foo",
            "Binance Will List Foo (FOO)",
            "https://www.binance.com/en/support/announcement/binance-will-list-foo-foo",
            Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_block_message() {
        let message = WebhookMessage::for_announcement(&item(), &NotifierConfig::default());

        assert!(message.text.starts_with("<!here> New Binance Listing Alert!"));
        assert!(message.text.contains("Binance Will List Foo (FOO)"));
        assert_eq!(message.blocks.len(), 4);
        assert_eq!(message.blocks[0]["type"], "header");
        assert_eq!(
            message.blocks[2]["fields"][2]["text"],
            "*Symbols:*\nFOO"
        );
    }

    #[test]
    fn test_plain_message_has_only_text() {
        let config = NotifierConfig {
            blocks: false,
            mention: String::new(),
            template: "{title} ({id})".into(),
            ..NotifierConfig::default()
        };
        let message = WebhookMessage::for_announcement(&item(), &config);
        let body = serde_json::to_value(&message).unwrap();

        assert_eq!(
            body,
            json!({
                "text": "New Binance Listing Alert! 🚨\nBinance Will List Foo (FOO) (binance-will-list-foo-foo)"
            })
        );
    }
}
