//! Message types flowing through the reconstruction pipeline.
//!
//! - [`RawMessage`] is what a log loader produces: one record per log entry,
//!   immutable once loaded.
//! - [`LogicalMessage`] is what the writer meant to say. Split posts have been
//!   stitched back together, and every pipeline stage annotates it in place.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use rpformat::{LogicalMessage, RawMessage};
//!
//! let start = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
//! let raw = RawMessage::new("Alice", "The door creaks open.", start);
//!
//! let msg = LogicalMessage::from_raw(1, &raw, start);
//! assert_eq!(msg.word_count, 4);
//! assert_eq!(msg.into_session, "00:00");
//! assert_eq!(msg.datetime, "2024-03-01 T 20:00");
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::core::markup::count_words;

/// Display format for a message's wall-clock time.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d T %H:%M";

/// A single entry of a chat log, as loaded.
///
/// Loaders guarantee that a sequence of raw messages is in non-decreasing
/// `sent_at` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Display name of the writer.
    pub author: String,

    /// Text of the entry, with unicode escapes already decoded.
    pub body: String,

    /// When the entry was posted.
    pub sent_at: DateTime<Utc>,
}

impl RawMessage {
    /// Creates a new raw message.
    pub fn new(author: impl Into<String>, body: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            sent_at,
        }
    }
}

/// How a logical message came out of the continuation merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    /// A single log entry that never took part in a continuation chain.
    #[default]
    Standalone,
    /// Looked continued, but no continuation followed it.
    Continued,
    /// The result of stitching two or more log entries together.
    CombinedResult,
}

/// A reconstructed message.
///
/// Ids are assigned once by the merger (dense, `1..=k`, in time order) and are
/// never renumbered afterwards: later stages only annotate or remove entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalMessage {
    /// Position in the reconstructed conversation.
    pub id: u64,

    /// Display name of the writer.
    pub author: String,

    /// Text, continuation marks stripped.
    pub body: String,

    /// Number of whitespace-separated words in `body`.
    pub word_count: usize,

    /// When the first fragment was posted.
    pub sent_at: DateTime<Utc>,

    /// Time into the session, adjusted when gaps are squashed.
    pub elapsed_since_start: TimeDelta,

    /// `sent_at` rendered with [`DATETIME_FORMAT`].
    pub datetime: String,

    /// `elapsed_since_start` rendered as `HH:MM`.
    pub into_session: String,

    /// Bracketed meta-commentary rather than in-fiction text.
    pub is_out_of_character: bool,

    /// Contains at least one emphasis mark.
    pub has_emphasis: bool,

    /// Ends with a continuation marker and was not completed.
    pub is_continued: bool,

    /// Starts (or ends) like a later fragment of a split post.
    pub is_continuation_of_previous: bool,

    /// Outcome of continuation merging.
    pub merge_status: MergeStatus,

    /// Silence between the previous message and this one, when it was
    /// abnormal enough to be flagged.
    pub gap_after: Option<TimeDelta>,
}

impl LogicalMessage {
    /// Builds a standalone logical message from a log entry.
    ///
    /// Classification flags start cleared; the merger fills them in.
    pub fn from_raw(id: u64, raw: &RawMessage, session_start: DateTime<Utc>) -> Self {
        let elapsed = raw.sent_at - session_start;
        Self {
            id,
            author: raw.author.clone(),
            body: raw.body.clone(),
            word_count: count_words(&raw.body),
            sent_at: raw.sent_at,
            elapsed_since_start: elapsed,
            datetime: raw.sent_at.format(DATETIME_FORMAT).to_string(),
            into_session: format_hh_mm(elapsed),
            is_out_of_character: false,
            has_emphasis: false,
            is_continued: false,
            is_continuation_of_previous: false,
            merge_status: MergeStatus::Standalone,
            gap_after: None,
        }
    }

    /// Replaces the body and recomputes the word count.
    pub fn set_body(&mut self, body: String) {
        self.word_count = count_words(&body);
        self.body = body;
    }

    /// Sets the elapsed session time and refreshes its display string.
    pub fn set_elapsed(&mut self, elapsed: TimeDelta) {
        self.elapsed_since_start = elapsed;
        self.into_session = format_hh_mm(elapsed);
    }

    /// Returns `true` if this message is the product of a merge.
    pub fn is_combined(&self) -> bool {
        self.merge_status == MergeStatus::CombinedResult
    }
}

/// Formats a duration as `HH:MM`.
///
/// Hours are not wrapped at 24, and negative durations get a leading `-`.
///
/// ```
/// use chrono::TimeDelta;
/// use rpformat::message::format_hh_mm;
///
/// assert_eq!(format_hh_mm(TimeDelta::minutes(95)), "01:35");
/// assert_eq!(format_hh_mm(TimeDelta::hours(30)), "30:00");
/// assert_eq!(format_hh_mm(TimeDelta::minutes(-5)), "-00:05");
/// ```
pub fn format_hh_mm(delta: TimeDelta) -> String {
    let minutes = delta.num_minutes();
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.unsigned_abs();
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_from_raw() {
        let raw = RawMessage::new("Alice", "She smiles and waves.", at(21, 15));
        let msg = LogicalMessage::from_raw(3, &raw, at(20, 0));

        assert_eq!(msg.id, 3);
        assert_eq!(msg.author, "Alice");
        assert_eq!(msg.word_count, 4);
        assert_eq!(msg.elapsed_since_start, TimeDelta::minutes(75));
        assert_eq!(msg.into_session, "01:15");
        assert_eq!(msg.datetime, "2024-03-01 T 21:15");
        assert_eq!(msg.merge_status, MergeStatus::Standalone);
        assert!(msg.gap_after.is_none());
    }

    #[test]
    fn test_set_body_recounts_words() {
        let raw = RawMessage::new("Bob", "one two", at(20, 0));
        let mut msg = LogicalMessage::from_raw(1, &raw, at(20, 0));
        msg.set_body("one two three four".to_string());
        assert_eq!(msg.word_count, 4);
    }

    #[test]
    fn test_set_elapsed_refreshes_display() {
        let raw = RawMessage::new("Bob", "anything", at(20, 0));
        let mut msg = LogicalMessage::from_raw(1, &raw, at(20, 0));
        msg.set_elapsed(TimeDelta::minutes(125));
        assert_eq!(msg.into_session, "02:05");
    }

    #[test]
    fn test_format_hh_mm() {
        assert_eq!(format_hh_mm(TimeDelta::zero()), "00:00");
        assert_eq!(format_hh_mm(TimeDelta::seconds(59)), "00:00");
        assert_eq!(format_hh_mm(TimeDelta::hours(100)), "100:00");
        assert_eq!(format_hh_mm(TimeDelta::minutes(-61)), "-01:01");
    }

    #[test]
    fn test_raw_message_serde() {
        let raw = RawMessage::new("Alice", "Hello there, friend", at(20, 0));
        let json = serde_json::to_string(&raw).unwrap();
        let parsed: RawMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(raw, parsed);
    }
}
