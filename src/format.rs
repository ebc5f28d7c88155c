//! Output format selection.
//!
//! # Example
//!
//! ```rust
//! use rpformat::format::OutputFormat;
//!
//! let format = OutputFormat::from_path("session.jsonl")?;
//! assert_eq!(format, OutputFormat::Jsonl);
//! assert_eq!(OutputFormat::default(), OutputFormat::Html);
//! # Ok::<(), rpformat::RpError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::core::models::{RelatedImage, Transcript};
use crate::core::output::HtmlWriter;
use crate::error::{Result, RpError};

/// Output format for a reconstructed transcript.
///
/// - [`Html`](OutputFormat::Html) - the readable page, filled into a template
/// - [`Json`](OutputFormat::Json) - array of message records
/// - [`Jsonl`](OutputFormat::Jsonl) - one message record per line
/// - [`Csv`](OutputFormat::Csv) - semicolon-delimited table
///
/// # Example
///
/// ```rust
/// use rpformat::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("htm").unwrap();
/// assert_eq!(format, OutputFormat::Html);
/// assert_eq!(format.extension(), "html");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Formatted HTML (default)
    #[default]
    Html,

    /// JSON array of messages
    Json,

    /// JSON Lines, also known as NDJSON
    Jsonl,

    /// CSV with semicolon delimiter
    Csv,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["html", "htm", "json", "jsonl", "ndjson", "csv"]
    }

    /// Returns all available formats.
    pub fn all() -> &'static [OutputFormat] {
        &[
            OutputFormat::Html,
            OutputFormat::Json,
            OutputFormat::Jsonl,
            OutputFormat::Csv,
        ]
    }

    /// Returns the MIME type for this format.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rpformat::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Html.mime_type(), "text/html");
    /// ```
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Html => "text/html",
            OutputFormat::Json => "application/json",
            OutputFormat::Jsonl => "application/x-ndjson",
            OutputFormat::Csv => "text/csv",
        }
    }

    /// Detects format from a file path based on extension.
    pub fn from_path(path: &str) -> Result<Self> {
        let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();

        match ext.as_str() {
            "html" | "htm" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(RpError::invalid_format(
                "output",
                format!(
                    "Unknown file extension: '.{}'. Expected one of: html, json, jsonl, csv",
                    ext
                ),
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "HTML"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" | "htm" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

/// Writes a transcript to a file in the specified format.
///
/// `html` and `images` are only used for [`OutputFormat::Html`].
///
/// # Errors
///
/// Returns an error if:
/// - The required feature for the format is not enabled
/// - The file cannot be written
pub fn write_to_format(
    transcript: &Transcript,
    images: &[RelatedImage],
    html: &HtmlWriter,
    path: &str,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Html => html.write(transcript, images, path),
        OutputFormat::Json => crate::core::output::write_json(transcript, path),
        OutputFormat::Jsonl => crate::core::output::write_jsonl(transcript, path),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::write_csv(transcript, path),
        #[cfg(not(feature = "csv-output"))]
        OutputFormat::Csv => Err(missing_csv_feature()),
    }
}

/// Converts a transcript to a string in the specified format.
pub fn to_format_string(
    transcript: &Transcript,
    images: &[RelatedImage],
    html: &HtmlWriter,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Html => Ok(html.render(transcript, images)),
        OutputFormat::Json => crate::core::output::to_json(transcript),
        OutputFormat::Jsonl => crate::core::output::to_jsonl(transcript),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::to_csv(transcript),
        #[cfg(not(feature = "csv-output"))]
        OutputFormat::Csv => Err(missing_csv_feature()),
    }
}

#[cfg(not(feature = "csv-output"))]
fn missing_csv_feature() -> RpError {
    RpError::invalid_format(
        "output",
        "Output format CSV requires the 'csv-output' feature to be enabled",
    )
}
