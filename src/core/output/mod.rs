//! Output format writers.
//!
//! This module provides writers for different output formats:
//! - [`HtmlWriter`] - the formatted transcript, rendered into an HTML template
//! - [`write_json`] / [`to_json`] - JSON array of messages
//! - [`write_jsonl`] / [`to_jsonl`] - JSON Lines (one message per line)
//! - [`write_csv`] / [`to_csv`] - CSV with semicolon delimiter - requires `csv-output` feature
//!
//! The structured formats share one record per message, [`TranscriptMessage`].
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> rpformat::Result<()> {
//! use rpformat::core::output::{HtmlWriter, write_json};
//! use rpformat::core::pipeline::Pipeline;
//! use rpformat::parser::LogFormat;
//!
//! let output = Pipeline::default().process_file("session.json".as_ref(), LogFormat::Chat2)?;
//!
//! HtmlWriter::new().write(&output.transcript, &[], "session.html")?;
//! write_json(&output.transcript, "session.out.json")?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
mod html_writer;
mod json_writer;
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
pub use html_writer::{DEFAULT_TEMPLATE, HtmlWriter, TEMPLATE_TAGS};
pub use json_writer::{to_json, write_json};
pub use jsonl_writer::{to_jsonl, write_jsonl};

use serde::Serialize;

use crate::message::{LogicalMessage, MergeStatus, format_hh_mm};

/// One message as written by the structured formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptMessage {
    pub id: u64,
    pub author: String,
    pub body: String,
    pub word_count: usize,
    pub datetime: String,
    pub into_session: String,
    pub merge_status: MergeStatus,
    pub out_of_character: bool,
    pub emphasis: bool,
    /// Silence before this message, `HH:MM`, when one was flagged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_before: Option<String>,
}

impl From<&LogicalMessage> for TranscriptMessage {
    fn from(msg: &LogicalMessage) -> Self {
        Self {
            id: msg.id,
            author: msg.author.clone(),
            body: msg.body.clone(),
            word_count: msg.word_count,
            datetime: msg.datetime.clone(),
            into_session: msg.into_session.clone(),
            merge_status: msg.merge_status,
            out_of_character: msg.is_out_of_character,
            emphasis: msg.has_emphasis,
            gap_before: msg.gap_after.map(format_hh_mm),
        }
    }
}
