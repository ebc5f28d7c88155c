//! Dropping out-of-character asides.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use rpformat::core::filter::remove_out_of_character;
//! use rpformat::{LogicalMessage, RawMessage};
//!
//! let t = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
//! let mut aside = LogicalMessage::from_raw(1, &RawMessage::new("Bob", "(brb, pizza)", t), t);
//! aside.is_out_of_character = true;
//! let line = LogicalMessage::from_raw(2, &RawMessage::new("Alice", "She waits.", t), t);
//!
//! let (kept, removed) = remove_out_of_character(vec![aside, line]);
//! assert_eq!(removed, 1);
//! assert_eq!(kept[0].id, 2);
//! ```

use tracing::debug;

use crate::message::LogicalMessage;

/// Removes messages flagged out-of-character.
///
/// Order and ids of the remaining messages are preserved. Returns the kept
/// messages and how many were removed.
pub fn remove_out_of_character(messages: Vec<LogicalMessage>) -> (Vec<LogicalMessage>, usize) {
    let before = messages.len();
    let kept: Vec<LogicalMessage> = messages
        .into_iter()
        .filter(|m| {
            if m.is_out_of_character {
                debug!(message_id = m.id, author = %m.author, "removing OOC message");
            }
            !m.is_out_of_character
        })
        .collect();

    let removed = before - kept.len();
    (kept, removed)
}
