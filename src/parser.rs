//! Unified loader trait for chat logs.
//!
//! A loader turns a log file into a [`LoadedLog`]: the session it describes
//! and its entries as [`RawMessage`]s, in time order.
//!
//! # Example
//!
//! ```rust
//! use rpformat::parser::{LogFormat, create_loader};
//!
//! let loader = create_loader(LogFormat::Chat2, 10);
//! let log = loader.load_str(r#"[
//!     {"OwnerId": "Alice", "SenderName": "Alice", "Message": "She pushes the door open.", "DateSent": "2024-03-01T20:00:00+00:00"},
//!     {"OwnerId": "Alice", "SenderName": "Bob", "Message": "ok", "DateSent": "2024-03-01T20:01:00+00:00"}
//! ]"#)?;
//!
//! assert_eq!(log.messages.len(), 1);
//! assert_eq!(log.skipped, 1);
//! assert_eq!(log.session.participants, vec!["Alice", "Bob"]);
//! # Ok::<(), rpformat::RpError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::models::Session;
use crate::error::Result;
use crate::message::RawMessage;

/// Supported log formats.
///
/// # Example
///
/// ```rust
/// use rpformat::parser::LogFormat;
/// use std::str::FromStr;
///
/// assert_eq!(LogFormat::from_str("chat2").unwrap(), LogFormat::Chat2);
/// assert_eq!(LogFormat::from_str("dc").unwrap(), LogFormat::Discord);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum LogFormat {
    /// JSON array written by the Chat 2 game chat plugin
    #[default]
    Chat2,

    /// JSON export from DiscordChatExporter
    #[serde(alias = "dc")]
    Discord,
}

impl LogFormat {
    /// Returns the default file extension for logs in this format.
    pub fn default_extension(&self) -> &'static str {
        match self {
            LogFormat::Chat2 | LogFormat::Discord => "json",
        }
    }

    /// Returns all format names including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &["chat2", "discord", "dc"]
    }

    /// Returns all available formats.
    pub fn all() -> &'static [LogFormat] {
        &[LogFormat::Chat2, LogFormat::Discord]
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Chat2 => write!(f, "Chat2"),
            LogFormat::Discord => write!(f, "Discord"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat2" | "chat 2" => Ok(LogFormat::Chat2),
            "discord" | "dc" => Ok(LogFormat::Discord),
            _ => Err(format!(
                "Unknown log format: '{}'. Expected one of: {}",
                s,
                LogFormat::all_names().join(", ")
            )),
        }
    }
}

/// A loaded log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedLog {
    /// Who took part and when.
    pub session: Session,

    /// Entries kept, in non-decreasing `sent_at` order.
    pub messages: Vec<RawMessage>,

    /// Entries dropped: too short, or with an unreadable timestamp.
    pub skipped: usize,
}

/// Trait for loading chat logs.
///
/// Loaders must implement:
/// - [`name`](LogSource::name) - Loader identifier
/// - [`format`](LogSource::format) - Format this loader handles
/// - [`load`](LogSource::load) - Read a log file
/// - [`load_str`](LogSource::load_str) - Read a log already in memory
pub trait LogSource: Send + Sync {
    /// Returns the human-readable name of this loader.
    fn name(&self) -> &'static str;

    /// Returns the format this loader handles.
    fn format(&self) -> LogFormat;

    /// Loads a log file.
    ///
    /// # Errors
    ///
    /// Returns [`RpError`](crate::RpError) if:
    /// - File cannot be read ([`RpError::Io`](crate::RpError::Io))
    /// - Content cannot be parsed ([`RpError::Parse`](crate::RpError::Parse))
    /// - The log has no entries ([`RpError::InvalidFormat`](crate::RpError::InvalidFormat))
    fn load(&self, path: &Path) -> Result<LoadedLog>;

    /// Loads a log from a string.
    fn load_str(&self, content: &str) -> Result<LoadedLog>;

    /// Loads a log file (convenience method accepting &str path).
    fn load_file(&self, path: &str) -> Result<LoadedLog> {
        self.load(Path::new(path))
    }
}

/// Creates a loader for the specified format.
///
/// Entries whose body is shorter than `min_message_length` characters are
/// dropped.
///
/// # Example
///
/// ```rust
/// use rpformat::parser::{LogFormat, create_loader};
///
/// let loader = create_loader(LogFormat::Discord, 10);
/// assert_eq!(loader.name(), "Discord");
/// ```
pub fn create_loader(format: LogFormat, min_message_length: usize) -> Box<dyn LogSource> {
    match format {
        LogFormat::Chat2 => Box::new(crate::parsers::Chat2Loader::new(min_message_length)),
        LogFormat::Discord => Box::new(crate::parsers::DiscordLoader::new(min_message_length)),
    }
}
