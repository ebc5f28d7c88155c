//! Core data models shared by the pipeline stages and the writers.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{DATETIME_FORMAT, LogicalMessage, format_hh_mm};

/// Reading speed used for the read time estimate, in words per minute.
const WORDS_PER_MINUTE: usize = 200;

/// Who took part in a log and when it ran.
///
/// `start` and `end` come from the first and last entries of the log, before
/// any entry is dropped for being too short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Whose log this is.
    pub owner: String,
    /// Distinct authors, in order of first appearance.
    pub participants: Vec<String>,
    /// Time of the first entry.
    pub start: DateTime<Utc>,
    /// Time of the last entry.
    pub end: DateTime<Utc>,
}

impl Session {
    /// Wall-clock length of the session.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// An abnormal silence, keyed by the message that ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    /// Id of the first message after the silence.
    pub after_message_id: u64,
    /// Length of the silence.
    pub duration: TimeDelta,
}

/// An image file found next to a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Where the file lives.
    pub path: PathBuf,
    /// Timestamp read from the file name, if it carried one.
    pub extracted_timestamp: Option<DateTime<Utc>>,
    /// File modification time.
    pub fallback_timestamp: DateTime<Utc>,
    /// Message id written at the start of the file name, e.g. `7_snapshot.png`.
    pub explicit_message_id: Option<u64>,
}

impl ImageDescriptor {
    /// The timestamp correlation should use.
    pub fn best_timestamp(&self) -> DateTime<Utc> {
        self.extracted_timestamp.unwrap_or(self.fallback_timestamp)
    }

    /// The file name, for display.
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

/// An image attached to a message, ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedImage {
    /// Where the file lives.
    pub image_path: PathBuf,
    /// The message it depicts.
    pub related_message_id: u64,
    /// MIME type guessed from the extension.
    pub mime_type: &'static str,
    /// File contents, base64 encoded.
    pub encoded_payload: String,
}

impl RelatedImage {
    /// Reads and encodes an image file.
    pub fn encode(path: &Path, related_message_id: u64) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self {
            image_path: path.to_path_buf(),
            related_message_id,
            mime_type: mime_type_for(path),
            encoded_payload: base64::engine::general_purpose::STANDARD.encode(bytes),
        })
    }

    /// `data:` URI for use in an `img` tag.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.encoded_payload)
    }

    /// The file name, for display.
    pub fn file_name(&self) -> String {
        file_name(&self.image_path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// MIME type for a supported image extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// A reconstructed session: the evolving message list plus what the stages
/// learned about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Who and when.
    pub session: Session,
    /// Logical messages in time order.
    pub messages: Vec<LogicalMessage>,
    /// Reported session length, shortened when gaps are squashed.
    pub duration: TimeDelta,
    /// Abnormal silences found, in message order.
    pub gaps: Vec<Gap>,
}

impl Transcript {
    /// Creates a transcript with the session's wall-clock duration.
    pub fn new(session: Session, messages: Vec<LogicalMessage>) -> Self {
        let duration = session.duration();
        Self {
            session,
            messages,
            duration,
            gaps: Vec::new(),
        }
    }

    /// Authors who still have messages, in order of first appearance.
    pub fn authors(&self) -> Vec<&str> {
        let mut authors: Vec<&str> = Vec::new();
        for message in &self.messages {
            if !authors.contains(&message.author.as_str()) {
                authors.push(&message.author);
            }
        }
        authors
    }

    /// Authors joined for a title: `A`, `A and B`, or `A, B, C`.
    pub fn authors_summary(&self) -> String {
        let authors = self.authors();
        match authors.as_slice() {
            [] => String::new(),
            [only] => (*only).to_string(),
            [first, second] => format!("{first} and {second}"),
            many => many.join(", "),
        }
    }

    /// Total words across all messages.
    pub fn word_count(&self) -> usize {
        self.messages.iter().map(|m| m.word_count).sum()
    }

    /// Estimated reading time in minutes, rounded up.
    pub fn read_time_minutes(&self) -> usize {
        self.word_count().div_ceil(WORDS_PER_MINUTE)
    }

    /// Session start and end, e.g. `2024-03-01 T 20:00 - 2024-03-01 T 23:10`.
    pub fn datetime(&self) -> String {
        format!(
            "{} - {}",
            self.session.start.format(DATETIME_FORMAT),
            self.session.end.format(DATETIME_FORMAT)
        )
    }

    /// Reported session length as `HH:MM`.
    pub fn duration_display(&self) -> String {
        format_hh_mm(self.duration)
    }

    /// Size summary, e.g. `12 messages, 840 words, ~5 min read time`.
    pub fn metadata(&self) -> String {
        format!(
            "{} messages, {} words, ~{} min read time",
            self.messages.len(),
            self.word_count(),
            self.read_time_minutes()
        )
    }

    /// Looks up a message by id.
    pub fn message(&self, id: u64) -> Option<&LogicalMessage> {
        self.messages
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|index| &self.messages[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RawMessage;
    use chrono::TimeZone;
    use std::io::Write;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    fn session() -> Session {
        Session {
            owner: "Alice".into(),
            participants: vec!["Alice".into(), "Bob".into()],
            start: at(20, 0),
            end: at(22, 30),
        }
    }

    fn transcript(authors: &[&str]) -> Transcript {
        let messages = authors
            .iter()
            .enumerate()
            .map(|(i, author)| {
                let raw = RawMessage::new(*author, "one two three four five", at(20, i as u32));
                LogicalMessage::from_raw(i as u64 + 1, &raw, at(20, 0))
            })
            .collect();
        Transcript::new(session(), messages)
    }

    #[test]
    fn test_authors_summary() {
        assert_eq!(transcript(&[]).authors_summary(), "");
        assert_eq!(transcript(&["Alice", "Alice"]).authors_summary(), "Alice");
        assert_eq!(
            transcript(&["Alice", "Bob", "Alice"]).authors_summary(),
            "Alice and Bob"
        );
        assert_eq!(
            transcript(&["Alice", "Bob", "Carol"]).authors_summary(),
            "Alice, Bob, Carol"
        );
    }

    #[test]
    fn test_metadata() {
        let t = transcript(&["Alice", "Bob"]);
        assert_eq!(t.word_count(), 10);
        assert_eq!(t.read_time_minutes(), 1);
        assert_eq!(t.duration_display(), "02:30");
        assert_eq!(t.datetime(), "2024-03-01 T 20:00 - 2024-03-01 T 22:30");
        assert_eq!(t.metadata(), "2 messages, 10 words, ~1 min read time");
    }

    #[test]
    fn test_message_lookup() {
        let t = transcript(&["Alice", "Bob", "Carol"]);
        assert_eq!(t.message(2).map(|m| m.author.as_str()), Some("Bob"));
        assert!(t.message(9).is_none());
    }

    #[test]
    fn test_best_timestamp_prefers_file_name() {
        let mut image = ImageDescriptor {
            path: PathBuf::from("shot.png"),
            extracted_timestamp: Some(at(21, 0)),
            fallback_timestamp: at(23, 0),
            explicit_message_id: None,
        };
        assert_eq!(image.best_timestamp(), at(21, 0));
        image.extracted_timestamp = None;
        assert_eq!(image.best_timestamp(), at(23, 0));
    }

    #[test]
    fn test_related_image_encode() {
        let mut file = tempfile::Builder::new().suffix(".PNG").tempfile().unwrap();
        file.write_all(b"fake png").unwrap();

        let image = RelatedImage::encode(file.path(), 4).unwrap();
        assert_eq!(image.related_message_id, 4);
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.encoded_payload, "ZmFrZSBwbmc=");
        assert_eq!(image.data_uri(), "data:image/png;base64,ZmFrZSBwbmc=");
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("a.gif")), "application/octet-stream");
    }
}
