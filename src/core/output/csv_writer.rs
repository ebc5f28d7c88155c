//! CSV output writer.

use std::fs::File;

use crate::core::models::Transcript;
use crate::error::{Result, RpError};
use crate::message::{LogicalMessage, MergeStatus, format_hh_mm};

const HEADER: [&str; 8] = [
    "ID",
    "Author",
    "Body",
    "Words",
    "Datetime",
    "IntoSession",
    "Status",
    "GapBefore",
];

/// Writes the transcript's messages to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: `ID`, `Author`, `Body`, `Words`, `Datetime`, `IntoSession`,
///   `Status`, `GapBefore` (empty when no gap was flagged)
/// - Encoding: UTF-8
pub fn write_csv(transcript: &Transcript, output_path: &str) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(file);

    writer.write_record(HEADER)?;
    for msg in &transcript.messages {
        writer.write_record(build_record(msg))?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts the transcript's messages to a CSV string.
pub fn to_csv(transcript: &Transcript) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for msg in &transcript.messages {
        writer.write_record(build_record(msg))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| RpError::Utf8 {
        context: "CSV output".to_string(),
        source: e,
    })
}

fn status_label(status: MergeStatus) -> &'static str {
    match status {
        MergeStatus::Standalone => "standalone",
        MergeStatus::Continued => "continued",
        MergeStatus::CombinedResult => "combined",
    }
}

fn build_record(msg: &LogicalMessage) -> Vec<String> {
    vec![
        msg.id.to_string(),
        msg.author.clone(),
        msg.body.clone(),
        msg.word_count.to_string(),
        msg.datetime.clone(),
        msg.into_session.clone(),
        status_label(msg.merge_status).to_string(),
        msg.gap_after.map(format_hh_mm).unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::test_support::transcript;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_csv() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        write_csv(&transcript(), path).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("ID;Author;Body;Words;Datetime;IntoSession;Status;GapBefore"));
        assert!(content.contains("1;Alice;She lifts the lantern and *stares*.;6;2024-03-01 T 20:00;00:00;standalone;"));
        // bodies containing the delimiter are quoted
        assert!(content.contains("3;Alice;\"Hours later; she returns.\";4;2024-03-02 T 01:00;05:00;standalone;04:55"));
    }

    #[test]
    fn test_to_csv_is_readable() {
        let csv_string = to_csv(&transcript()).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(csv_string.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][1], "Bob");
        assert_eq!(&rows[1][2], "He says \"hello\" & waits.");
        assert_eq!(&rows[1][6], "combined");
    }
}
