//! JSON output writer.

use std::fs::File;
use std::io::Write;

use super::TranscriptMessage;
use crate::core::models::Transcript;
use crate::error::Result;

/// Writes the transcript's messages to a JSON file as an array.
///
/// # Format
/// ```json
/// [
///   {"id": 1, "author": "Alice", "body": "She waves.", "word_count": 2, ...},
///   {"id": 2, "author": "Bob", "body": "He nods.", "word_count": 2, ...}
/// ]
/// ```
pub fn write_json(transcript: &Transcript, output_path: &str) -> Result<()> {
    let json = to_json(transcript)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Converts the transcript's messages to a pretty-printed JSON array.
pub fn to_json(transcript: &Transcript) -> Result<String> {
    let records: Vec<TranscriptMessage> = transcript
        .messages
        .iter()
        .map(TranscriptMessage::from)
        .collect();

    Ok(serde_json::to_string_pretty(&records)?)
}
