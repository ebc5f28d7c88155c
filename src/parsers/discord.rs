//! Discord export loader.
//!
//! Handles JSON exports from DiscordChatExporter. The channel name becomes
//! the session owner; attachments are appended to the body as
//! `[Attachment: name]` so they survive into the transcript.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{LogRecord, build_log, parse_timestamp};
use crate::config::DEFAULT_MIN_MESSAGE_LENGTH;
use crate::error::{Result, RpError};
use crate::parser::{LoadedLog, LogFormat, LogSource};

const FORMAT_NAME: &str = "Discord JSON";

/// Loader for DiscordChatExporter JSON exports.
#[derive(Debug, Clone)]
pub struct DiscordLoader {
    min_message_length: usize,
}

impl DiscordLoader {
    /// Creates a loader dropping entries shorter than `min_message_length`
    /// characters.
    pub fn new(min_message_length: usize) -> Self {
        Self { min_message_length }
    }

    fn build(&self, export: DiscordExport) -> Result<LoadedLog> {
        let owner = export.channel.map(|c| c.name);
        let records = export
            .messages
            .into_iter()
            .map(|msg| {
                let mut content = msg.content;
                for attachment in msg.attachments.unwrap_or_default() {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str(&format!("[Attachment: {}]", attachment.file_name));
                }

                // Use nickname if available, fallback to username
                let author = msg.author.nickname.unwrap_or(msg.author.name);

                LogRecord {
                    author,
                    body: content,
                    sent_at: parse_timestamp(&msg.timestamp),
                }
            })
            .collect();

        build_log(FORMAT_NAME, owner, records, self.min_message_length)
    }
}

impl Default for DiscordLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MESSAGE_LENGTH)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscordExport {
    channel: Option<DiscordChannel>,
    messages: Vec<DiscordMessage>,
}

#[derive(Debug, Deserialize)]
struct DiscordChannel {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscordMessage {
    timestamp: String,
    #[serde(default)]
    content: String,
    author: DiscordAuthor,
    attachments: Option<Vec<DiscordAttachment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscordAuthor {
    name: String,
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscordAttachment {
    file_name: String,
}

impl LogSource for DiscordLoader {
    fn name(&self) -> &'static str {
        "Discord"
    }

    fn format(&self) -> LogFormat {
        LogFormat::Discord
    }

    fn load(&self, path: &Path) -> Result<LoadedLog> {
        let content = fs::read_to_string(path)?;
        let export: DiscordExport = serde_json::from_str(&content)
            .map_err(|e| RpError::discord_parse(e, Some(path.to_path_buf())))?;
        self.build(export)
    }

    fn load_str(&self, content: &str) -> Result<LoadedLog> {
        let export: DiscordExport =
            serde_json::from_str(content).map_err(|e| RpError::discord_parse(e, None))?;
        self.build(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_name() {
        let loader = DiscordLoader::default();
        assert_eq!(loader.name(), "Discord");
        assert_eq!(loader.format(), LogFormat::Discord);
    }

    #[test]
    fn test_load_str() {
        let json = r#"{
            "channel": {"id": "1", "name": "tavern-rp"},
            "messages": [
                {
                    "id": "123",
                    "timestamp": "2024-01-15T10:30:00+00:00",
                    "content": "The bard tunes her lute...",
                    "author": {"name": "alice123", "nickname": "Alice"}
                },
                {
                    "id": "124",
                    "timestamp": "2024-01-15T10:31:00+00:00",
                    "content": "and begins to play.",
                    "author": {"name": "alice123", "nickname": null}
                }
            ]
        }"#;

        let log = DiscordLoader::default().load_str(json).unwrap();
        assert_eq!(log.session.owner, "tavern-rp");
        assert_eq!(log.messages.len(), 2);
        assert_eq!(log.messages[0].author, "Alice");
        assert_eq!(log.messages[1].author, "alice123");
    }

    #[test]
    fn test_attachments_appended() {
        let json = r#"{
            "messages": [
                {
                    "id": "1",
                    "timestamp": "2024-01-15T10:30:00+00:00",
                    "content": "",
                    "author": {"name": "bob"},
                    "attachments": [{"id": "9", "url": "https://x/y.png", "fileName": "scene.png"}]
                }
            ]
        }"#;

        let log = DiscordLoader::default().load_str(json).unwrap();
        assert_eq!(log.session.owner, "bob");
        assert_eq!(log.messages[0].body, "[Attachment: scene.png]");
    }

    #[test]
    fn test_missing_messages_is_parse_error() {
        let err = DiscordLoader::default().load_str(r#"{"guild": {}}"#).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("Discord JSON"));
    }

    #[test]
    fn test_no_messages() {
        let err = DiscordLoader::default()
            .load_str(r#"{"messages": []}"#)
            .unwrap_err();
        assert!(err.is_invalid_format());
    }
}
