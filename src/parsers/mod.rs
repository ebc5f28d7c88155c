//! Chat log loaders.
//!
//! Each loader implements [`LogSource`](crate::parser::LogSource).
//!
//! # Available Loaders
//!
//! - [`Chat2Loader`] - Chat 2 plugin JSON logs
//! - [`DiscordLoader`] - DiscordChatExporter JSON exports

mod chat2;
mod discord;

pub use chat2::Chat2Loader;
pub use discord::DiscordLoader;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::core::markup::decode_unicode_escapes;
use crate::core::models::Session;
use crate::error::{ParseErrorKind, Result, RpError};
use crate::message::RawMessage;
use crate::parser::LoadedLog;

/// One log entry before validation.
#[derive(Debug, Clone)]
pub(crate) struct LogRecord {
    pub author: String,
    pub body: String,
    /// `None` when the timestamp could not be read.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Parses an RFC 3339 timestamp into UTC.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .or_else(|_| DateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.to_utc())
}

/// Builds a [`LoadedLog`] from raw records.
///
/// Session bounds come from the earliest and latest readable timestamps,
/// before short entries are dropped. Bodies have their unicode escapes decoded
/// before their length is checked.
pub(crate) fn build_log(
    format: &'static str,
    owner: Option<String>,
    records: Vec<LogRecord>,
    min_message_length: usize,
) -> Result<LoadedLog> {
    if records.is_empty() {
        return Err(RpError::invalid_format(format, "log contains no messages"));
    }

    let mut participants: Vec<String> = Vec::new();
    for record in &records {
        if !participants.contains(&record.author) {
            participants.push(record.author.clone());
        }
    }

    let timestamps: Vec<DateTime<Utc>> = records.iter().filter_map(|r| r.sent_at).collect();
    let (Some(&start), Some(&end)) = (timestamps.iter().min(), timestamps.iter().max()) else {
        return Err(RpError::Parse {
            format,
            source: ParseErrorKind::Timestamp("no entry has a readable timestamp".to_string()),
            path: None,
        });
    };

    let total = records.len();
    let mut skipped_short = 0;
    let mut skipped_time = 0;
    let mut messages = Vec::with_capacity(total);
    for record in records {
        let Some(sent_at) = record.sent_at else {
            skipped_time += 1;
            continue;
        };
        let body = decode_unicode_escapes(&record.body);
        if body.chars().count() < min_message_length {
            skipped_short += 1;
            continue;
        }
        messages.push(RawMessage::new(record.author, body, sent_at));
    }
    messages.sort_by_key(|m| m.sent_at);

    if skipped_time > 0 {
        debug!(count = skipped_time, "skipped entries with unreadable timestamps");
    }
    info!(
        format,
        entries = total,
        kept = messages.len(),
        skipped_short,
        participants = participants.len(),
        "log loaded"
    );

    let owner = owner.unwrap_or_else(|| participants[0].clone());
    Ok(LoadedLog {
        session: Session {
            owner,
            participants,
            start,
            end,
        },
        messages,
        skipped: skipped_short + skipped_time,
    })
}
