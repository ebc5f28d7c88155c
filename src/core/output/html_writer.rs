//! HTML output writer.
//!
//! Fills an HTML template with the transcript. Templates carry three tags:
//!
//! | Tag | Replaced with |
//! |-----|---------------|
//! | `{{ authors }}` | `A`, `A and B`, or `A, B, C` |
//! | `{{ metadata }}` | size summary and date range |
//! | `{{ messages }}` | one block per message, with gap notices and images |
//!
//! Message blocks sit between empty `<div>`s so a three-column grid keeps
//! them in the middle column.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::{DEFAULT_EMPHASIS_COLOR, MarkerTables};
use crate::core::markup::{escape_html, highlight_emphasis, unicode_escapes_to_entities};
use crate::core::models::{RelatedImage, Transcript};
use crate::error::{Result, RpError};
use crate::message::{LogicalMessage, format_hh_mm};

/// Built-in template, used when none is supplied.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../../templates/default.html");

/// Tags every template must contain, in fill order.
pub const TEMPLATE_TAGS: [&str; 3] = ["{{ authors }}", "{{ metadata }}", "{{ messages }}"];

/// Renders transcripts into an HTML template.
///
/// # Example
///
/// ```rust
/// use rpformat::core::output::HtmlWriter;
///
/// let writer = HtmlWriter::from_template("<h1>{{ authors }}</h1><p>{{ metadata }}</p>{{ messages }}")?;
/// let plain = HtmlWriter::new().without_emphasis();
/// # let _ = (writer, plain);
/// # Ok::<(), rpformat::RpError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HtmlWriter {
    template: String,
    emphasis_color: Option<String>,
    emphasis_marks: Vec<char>,
}

impl HtmlWriter {
    /// Creates a writer with the built-in template and default highlighting.
    pub fn new() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            emphasis_color: Some(DEFAULT_EMPHASIS_COLOR.to_string()),
            emphasis_marks: MarkerTables::default().emphasis_marks,
        }
    }

    /// Creates a writer for a custom template.
    ///
    /// # Errors
    ///
    /// Returns [`RpError::Template`] if a tag is missing.
    pub fn from_template(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let missing: Vec<&str> = TEMPLATE_TAGS
            .iter()
            .copied()
            .filter(|tag| !template.contains(tag))
            .collect();
        if !missing.is_empty() {
            return Err(RpError::template(format!(
                "template is missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            template,
            ..Self::new()
        })
    }

    /// Reads and validates a template file.
    pub fn load_template(path: &Path) -> Result<Self> {
        let template = fs::read_to_string(path)?;
        Self::from_template(template)
    }

    /// Highlights emphasis in this colour.
    #[must_use]
    pub fn with_emphasis_color(mut self, color: impl Into<String>) -> Self {
        self.emphasis_color = Some(color.into());
        self
    }

    /// Uses a different set of emphasis marks.
    #[must_use]
    pub fn with_emphasis_marks(mut self, marks: Vec<char>) -> Self {
        self.emphasis_marks = marks;
        self
    }

    /// Leaves emphasis marks as written.
    #[must_use]
    pub fn without_emphasis(mut self) -> Self {
        self.emphasis_color = None;
        self
    }

    /// Renders the filled template.
    ///
    /// Each image is placed after the message it belongs to. Images whose
    /// message no longer exists are placed at the end.
    pub fn render(&self, transcript: &Transcript, images: &[RelatedImage]) -> String {
        let mut messages = String::new();
        for message in &transcript.messages {
            if let Some(gap) = message.gap_after {
                messages.push_str(&gap_notice(gap));
            }
            messages.push_str(&self.message_block(message));
            for image in images.iter().filter(|i| i.related_message_id == message.id) {
                messages.push_str(&image_block(image));
            }
        }

        for image in images
            .iter()
            .filter(|i| transcript.message(i.related_message_id).is_none())
        {
            warn!(
                image = %image.image_path.display(),
                message_id = image.related_message_id,
                "no message with this id, image appended at the end"
            );
            messages.push_str(&image_block(image));
        }

        let metadata = format!(
            "{}<br>{}",
            escape_html(&transcript.metadata()),
            escape_html(&transcript.datetime())
        );

        debug!(messages = transcript.messages.len(), images = images.len(), "html rendered");

        self.template
            .replace(TEMPLATE_TAGS[0], &escape_html(&transcript.authors_summary()))
            .replace(TEMPLATE_TAGS[1], &metadata)
            .replace(TEMPLATE_TAGS[2], &messages)
    }

    /// Renders and writes to `output_path`.
    pub fn write(
        &self,
        transcript: &Transcript,
        images: &[RelatedImage],
        output_path: &str,
    ) -> Result<()> {
        fs::write(output_path, self.render(transcript, images))?;
        Ok(())
    }

    fn body_html(&self, body: &str) -> String {
        let html = unicode_escapes_to_entities(&escape_html(body));
        match &self.emphasis_color {
            Some(color) => highlight_emphasis(&html, &self.emphasis_marks, color),
            None => html,
        }
    }

    fn message_block(&self, message: &LogicalMessage) -> String {
        format!(
            "<div></div><a class='message' href='#{id}' id='{id}'>\
             <div class='header'>{author}</div>\
             <div class='body'>{body}</div>\
             <div class='footer'>{datetime} ({into} in)</div>\
             </a><div></div>\n",
            id = message.id,
            author = escape_html(&message.author),
            body = self.body_html(&message.body),
            datetime = message.datetime,
            into = message.into_session,
        )
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn gap_notice(gap: chrono::TimeDelta) -> String {
    format!(
        "<div></div><div class=\"message_gap_notice\">Gap of {} found. \
         Adjusting all time-in figures hereafter.</div><div></div>\n",
        format_hh_mm(gap)
    )
}

fn image_block(image: &RelatedImage) -> String {
    format!(
        "<div></div><div class=\"message_picture\"><img alt=\"{}, {}\" src=\"{}\"/></div><div></div>\n",
        escape_html(&image.file_name()),
        image.related_message_id,
        image.data_uri()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::test_support::transcript;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    const TEMPLATE: &str = "<title>{{ authors }}</title><p>{{ metadata }}</p><main>{{ messages }}</main>";

    fn image(id: u64) -> RelatedImage {
        RelatedImage {
            image_path: PathBuf::from(format!("shots/{id}.png")),
            related_message_id: id,
            mime_type: "image/png",
            encoded_payload: "AAAA".to_string(),
        }
    }

    #[test]
    fn test_default_template_has_all_tags() {
        for tag in TEMPLATE_TAGS {
            assert!(DEFAULT_TEMPLATE.contains(tag), "missing {tag}");
        }
    }

    #[test]
    fn test_from_template_rejects_missing_tags() {
        let err = HtmlWriter::from_template("<p>{{ authors }}</p>").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("{{ metadata }}"));
        assert!(text.contains("{{ messages }}"));
    }

    #[test]
    fn test_render_fills_tags() {
        let html = HtmlWriter::from_template(TEMPLATE)
            .unwrap()
            .render(&transcript(), &[]);

        assert!(html.starts_with("<title>Alice and Bob</title>"));
        assert!(html.contains("3 messages, 15 words, ~1 min read time<br>2024-03-01 T 20:00 - 2024-03-02 T 01:00"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_message_block() {
        let html = HtmlWriter::from_template(TEMPLATE)
            .unwrap()
            .render(&transcript(), &[]);

        assert!(html.contains(
            "<div></div><a class='message' href='#2' id='2'><div class='header'>Bob</div>\
             <div class='body'>He says &quot;hello&quot; &amp; waits.</div>\
             <div class='footer'>2024-03-01 T 20:05 (00:05 in)</div></a><div></div>\n"
        ));
    }

    #[test]
    fn test_emphasis_highlighting() {
        let writer = HtmlWriter::from_template(TEMPLATE).unwrap();
        let html = writer.render(&transcript(), &[]);
        assert!(html.contains(r#"and <span style="color: #DD9FC1;">stares</span>."#));

        let html = writer.without_emphasis().render(&transcript(), &[]);
        assert!(html.contains("and *stares*."));
    }

    #[test]
    fn test_gap_notice_precedes_message() {
        let html = HtmlWriter::from_template(TEMPLATE)
            .unwrap()
            .render(&transcript(), &[]);

        let notice = html
            .find("Gap of 04:55 found. Adjusting all time-in figures hereafter.")
            .unwrap();
        let third = html.find("id='3'").unwrap();
        let second = html.find("id='2'").unwrap();
        assert!(second < notice && notice < third);
    }

    #[test]
    fn test_images_follow_their_message() {
        let html = HtmlWriter::from_template(TEMPLATE)
            .unwrap()
            .render(&transcript(), &[image(1), image(9)]);

        let first = html.find("id='1'").unwrap();
        let picture = html.find(r#"alt="1.png, 1""#).unwrap();
        let second = html.find("id='2'").unwrap();
        assert!(first < picture && picture < second);
        assert!(html.contains(r#"src="data:image/png;base64,AAAA"/>"#));

        // no message 9: appended after the last message
        let orphan = html.find(r#"alt="9.png, 9""#).unwrap();
        assert!(orphan > html.find("id='3'").unwrap());
    }

    #[test]
    fn test_write() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        HtmlWriter::new().write(&transcript(), &[], path).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
        assert!(content.contains("<h1>Alice and Bob</h1>"));
    }

    #[test]
    fn test_load_template_missing_file() {
        let err = HtmlWriter::load_template(Path::new("/no/such/template.html")).unwrap_err();
        assert!(err.is_io());
    }
}
