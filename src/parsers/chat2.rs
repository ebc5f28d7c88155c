//! Chat 2 log loader.
//!
//! The Chat 2 plugin exports a JSON array with one object per chat line:
//!
//! ```json
//! [
//!   {
//!     "OwnerId": "Alice Example",
//!     "SenderName": "Alice Example",
//!     "Message": "She pushes the door open...",
//!     "DateSent": "2024-03-01T20:00:00+00:00"
//!   }
//! ]
//! ```
//!
//! Unknown fields are ignored.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{LogRecord, build_log, parse_timestamp};
use crate::config::DEFAULT_MIN_MESSAGE_LENGTH;
use crate::error::{Result, RpError};
use crate::parser::{LoadedLog, LogFormat, LogSource};

const FORMAT_NAME: &str = "Chat2 JSON";

/// Loader for Chat 2 JSON logs.
#[derive(Debug, Clone)]
pub struct Chat2Loader {
    min_message_length: usize,
}

impl Chat2Loader {
    /// Creates a loader dropping entries shorter than `min_message_length`
    /// characters.
    pub fn new(min_message_length: usize) -> Self {
        Self { min_message_length }
    }
}

impl Default for Chat2Loader {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MESSAGE_LENGTH)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Chat2Entry {
    #[serde(default)]
    owner_id: Option<String>,
    sender_name: String,
    #[serde(default)]
    message: String,
    date_sent: String,
}

impl LogSource for Chat2Loader {
    fn name(&self) -> &'static str {
        "Chat2"
    }

    fn format(&self) -> LogFormat {
        LogFormat::Chat2
    }

    fn load(&self, path: &Path) -> Result<LoadedLog> {
        let content = fs::read_to_string(path)?;
        let entries: Vec<Chat2Entry> = serde_json::from_str(&content)
            .map_err(|e| RpError::chat2_parse(e, Some(path.to_path_buf())))?;
        self.build(entries)
    }

    fn load_str(&self, content: &str) -> Result<LoadedLog> {
        let entries: Vec<Chat2Entry> =
            serde_json::from_str(content).map_err(|e| RpError::chat2_parse(e, None))?;
        self.build(entries)
    }
}

impl Chat2Loader {
    fn build(&self, entries: Vec<Chat2Entry>) -> Result<LoadedLog> {
        let owner = entries.first().and_then(|e| e.owner_id.clone());
        let records = entries
            .into_iter()
            .map(|entry| LogRecord {
                sent_at: parse_timestamp(&entry.date_sent),
                author: entry.sender_name,
                body: entry.message,
            })
            .collect();

        build_log(FORMAT_NAME, owner, records, self.min_message_length)
    }
}
