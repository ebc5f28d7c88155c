//! Unified error types for rpformat.
//!
//! The reconstruction algorithms themselves never fail: unresolved
//! continuations and images that cannot be placed are reported as counters.
//! Errors only come from the collaborators around them (reading logs,
//! templates and images, writing output, persisting settings).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for rpformat operations.
///
/// # Example
///
/// ```rust
/// use rpformat::error::Result;
/// use rpformat::RawMessage;
///
/// fn my_function() -> Result<Vec<RawMessage>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, RpError>;

/// The error type for all rpformat operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RpError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The log, template or an image file doesn't exist
    /// - Permission denied
    /// - Disk is full (when writing output)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse the input log.
    #[error("Failed to parse {format} log{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Parse {
        /// The log format being parsed (e.g., "Chat2 JSON")
        format: &'static str,
        /// The underlying parse error
        #[source]
        source: ParseErrorKind,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// The input doesn't match the expected structure.
    ///
    /// This occurs when:
    /// - The log contains no messages
    /// - A Discord export is missing the `messages` array
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// A highlight colour is not a `#RGB` / `#RRGGBB` hex string.
    #[error("Invalid colour '{input}'. Expected a hex colour such as #DD9FC1")]
    InvalidColor {
        /// The rejected input
        input: String,
    },

    /// The HTML template is unusable.
    #[error("Template error: {message}")]
    Template {
        /// Description of what's wrong
        message: String,
    },

    /// The settings file could not be read or written.
    #[error("Settings file {}: {source}", path.display())]
    Settings {
        /// Path of the settings file
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A marker pattern failed to compile.
    #[error("Invalid marker pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// JSON parsing/serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error in {context}: {source}")]
    Utf8 {
        /// Description of where the error occurred
        context: String,
        /// The underlying UTF-8 error
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Kinds of parse errors that can occur.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    /// JSON parsing error
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Timestamp that could not be understood
    #[error("{0}")]
    Timestamp(String),
}

impl From<std::string::FromUtf8Error> for RpError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        RpError::Utf8 {
            context: "output conversion".to_string(),
            source: err,
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl RpError {
    /// Creates a parse error for the Chat2 JSON format.
    pub fn chat2_parse(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        RpError::Parse {
            format: "Chat2 JSON",
            source: ParseErrorKind::Json(source),
            path,
        }
    }

    /// Creates a parse error for the Discord JSON format.
    pub fn discord_parse(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        RpError::Parse {
            format: "Discord JSON",
            source: ParseErrorKind::Json(source),
            path,
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        RpError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates an invalid colour error.
    pub fn invalid_color(input: impl Into<String>) -> Self {
        RpError::InvalidColor {
            input: input.into(),
        }
    }

    /// Creates a template error.
    pub fn template(message: impl Into<String>) -> Self {
        RpError::Template {
            message: message.into(),
        }
    }

    /// Creates a settings error.
    pub fn settings(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        RpError::Settings {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, RpError::Io(_))
    }

    /// Returns `true` if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, RpError::Parse { .. })
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, RpError::InvalidFormat { .. })
    }

    /// Returns the file path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            RpError::Parse { path, .. } => path.as_ref(),
            RpError::Settings { path, .. } => Some(path),
            _ => None,
        }
    }
}
