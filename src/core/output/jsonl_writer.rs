//! JSON Lines (JSONL) output writer.
//!
//! One message per line, for tools that read records one at a time.

use std::fs::File;
use std::io::{BufWriter, Write};

use super::TranscriptMessage;
use crate::core::models::Transcript;
use crate::error::Result;

/// Writes the transcript's messages in JSONL format.
///
/// Each line is a valid JSON object:
/// ```jsonl
/// {"id":1,"author":"Alice","body":"She waves.",...}
/// {"id":2,"author":"Bob","body":"He nods.",...}
/// ```
pub fn write_jsonl(transcript: &Transcript, output_path: &str) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    for msg in &transcript.messages {
        let line = serde_json::to_string(&TranscriptMessage::from(msg))?;
        writeln!(writer, "{line}")?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts the transcript's messages to a JSONL string.
pub fn to_jsonl(transcript: &Transcript) -> Result<String> {
    let mut out = String::new();
    for msg in &transcript.messages {
        out.push_str(&serde_json::to_string(&TranscriptMessage::from(msg))?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::test_support::transcript;
    use std::io::{BufRead, BufReader};
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_jsonl() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        write_jsonl(&transcript(), path).unwrap();

        let file = std::fs::File::open(path).unwrap();
        let lines: Vec<String> = BufReader::new(file).lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["author"], "Alice");
        assert_eq!(first["merge_status"], "standalone");

        let last: serde_json::Value = serde_json::from_str(&lines[2]).unwrap();
        assert_eq!(last["gap_before"], "04:55");
    }

    #[test]
    fn test_to_jsonl_matches_file_output() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        write_jsonl(&transcript(), path).unwrap();

        let in_memory = to_jsonl(&transcript()).unwrap();
        assert_eq!(in_memory, std::fs::read_to_string(path).unwrap());
        assert!(!in_memory.contains('['));
    }
}
