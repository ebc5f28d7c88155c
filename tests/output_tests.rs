//! Output tests: one reconstructed session written in every format.

use std::fs;

use tempfile::tempdir;

use rpformat::core::models::{RelatedImage, Transcript};
use rpformat::core::output::{HtmlWriter, to_json, to_jsonl};
use rpformat::core::pipeline::Pipeline;
use rpformat::format::{OutputFormat, to_format_string, write_to_format};
use rpformat::parser::{LogFormat, create_loader};

const LOG: &str = r#"[
  {"OwnerId": "Alice", "SenderName": "Alice", "Message": "The storm rolls in over the hills...", "DateSent": "2024-03-01T20:00:00+00:00"},
  {"OwnerId": "Alice", "SenderName": "Alice", "Message": "and the first drops hit the window.", "DateSent": "2024-03-01T20:00:40+00:00"},
  {"OwnerId": "Alice", "SenderName": "Bob", "Message": "(one sec, cat on keyboard)", "DateSent": "2024-03-01T20:01:30+00:00"},
  {"OwnerId": "Alice", "SenderName": "Bob", "Message": "He says \"not <yet>\" & lights a *second* candle.", "DateSent": "2024-03-01T20:02:30+00:00"},
  {"OwnerId": "Alice", "SenderName": "Bob", "Message": "Morning comes grey and cold.", "DateSent": "2024-03-02T02:00:00+00:00"},
  {"OwnerId": "Alice", "SenderName": "Alice", "Message": "She is already at the door.", "DateSent": "2024-03-02T02:01:00+00:00"}
]"#;

fn transcript() -> Transcript {
    let log = create_loader(LogFormat::Chat2, 10).load_str(LOG).unwrap();
    Pipeline::default().run(log, Vec::new()).transcript
}

// ============================================================================
// HTML
// ============================================================================

#[test]
fn test_html_messages_in_order() {
    let html = HtmlWriter::new().render(&transcript(), &[]);

    let storm = html.find("The storm rolls in").unwrap();
    let candle = html.find("lights a").unwrap();
    let notice = html.find("Gap of 05:57 found").unwrap();
    let morning = html.find("Morning comes").unwrap();
    assert!(storm < candle);
    assert!(candle < notice);
    assert!(notice < morning);
}

#[test]
fn test_html_escapes_bodies() {
    let html = HtmlWriter::new().without_emphasis().render(&transcript(), &[]);
    assert!(html.contains("He says &quot;not &lt;yet&gt;&quot; &amp; lights a *second* candle."));
    assert!(!html.contains("<yet>"));
}

#[test]
fn test_html_footer_uses_squashed_clock() {
    let html = HtmlWriter::new().render(&transcript(), &[]);
    assert!(html.contains("2024-03-02 T 02:00 (00:03 in)"));
    assert!(html.contains("2024-03-02 T 02:01 (00:04 in)"));
}

#[test]
fn test_html_custom_template() {
    let writer = HtmlWriter::from_template(
        "<h1>{{ authors }}</h1><p>{{ metadata }}</p><section>{{ messages }}</section><footer>{{ authors }}</footer>",
    )
    .unwrap()
    .with_emphasis_color("#00ff00");
    let html = writer.render(&transcript(), &[]);

    assert!(html.starts_with("<h1>Alice and Bob</h1><p>4 messages, "));
    assert!(html.ends_with("<footer>Alice and Bob</footer>"));
    assert!(html.contains(r#"<span style="color: #00ff00;">second</span>"#));
}

#[test]
fn test_html_orphan_image_is_appended() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stray.png");
    fs::write(&path, b"png").unwrap();
    let image = RelatedImage::encode(&path, 99).unwrap();

    let html = HtmlWriter::new().render(&transcript(), &[image]);
    let last_message = html.find("She is already at the door.").unwrap();
    let picture = html.find(r#"alt="stray.png, 99""#).unwrap();
    assert!(picture > last_message);
}

// ============================================================================
// Structured formats
// ============================================================================

#[test]
fn test_json_fields() {
    let json = to_json(&transcript()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let messages = value.as_array().unwrap();

    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["id"], 1);
    assert_eq!(messages[0]["merge_status"], "combined_result");
    assert_eq!(messages[0]["into_session"], "00:00");
    assert_eq!(messages[1]["emphasis"], true);
    assert_eq!(messages[2]["gap_before"], "05:57");
    assert!(messages[1].get("gap_before").is_none());
}

#[test]
fn test_jsonl_one_message_per_line() {
    let jsonl = to_jsonl(&transcript()).unwrap();
    let lines: Vec<&str> = jsonl.lines().collect();
    assert_eq!(lines.len(), 4);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value["author"].is_string());
    }
}

#[cfg(feature = "csv-output")]
#[test]
fn test_csv_readable_back() {
    let out = rpformat::core::output::to_csv(&transcript()).unwrap();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(out.as_bytes());

    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "ID");
    assert_eq!(&headers[7], "GapBefore");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(&rows[0][6], "combined");
    assert_eq!(&rows[1][2], "He says \"not <yet>\" & lights a *second* candle.");
    assert_eq!(&rows[2][7], "05:57");
    assert_eq!(&rows[3][7], "");
}

#[test]
fn test_every_format_writes_a_file() {
    let dir = tempdir().unwrap();
    let transcript = transcript();
    let writer = HtmlWriter::new();

    for &format in OutputFormat::all() {
        if cfg!(not(feature = "csv-output")) && format == OutputFormat::Csv {
            continue;
        }
        let path = dir.path().join(format!("session.{}", format.extension()));
        let path = path.to_str().unwrap();

        write_to_format(&transcript, &[], &writer, path, format).unwrap();

        let written = fs::read_to_string(path).unwrap();
        let expected = to_format_string(&transcript, &[], &writer, format).unwrap();
        assert_eq!(written, expected, "{format} file differs from its string form");
    }
}
