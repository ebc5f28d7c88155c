//! Configuration types for the reconstruction pipeline and the CLI.
//!
//! This module provides clean configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! - [`MarkerTables`] - the marker vocabulary the text classifier matches against
//! - [`PipelineConfig`] - which stages run and how
//! - [`Settings`] - the persisted settings document used by the CLI
//!
//! # Example
//!
//! ```rust
//! use rpformat::config::{ImageSearch, PipelineConfig};
//!
//! let config = PipelineConfig::new()
//!     .with_remove_out_of_character(false)
//!     .with_image_search(ImageSearch::NextToLog);
//!
//! assert!(config.combine_messages);
//! assert!(config.find_related_images());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RpError};
use crate::format::OutputFormat;
use crate::parser::LogFormat;

/// Default colour used to highlight emphasised words.
pub const DEFAULT_EMPHASIS_COLOR: &str = "#DD9FC1";

/// Default minimum body length (in characters) for a message to be kept.
pub const DEFAULT_MIN_MESSAGE_LENGTH: usize = 10;

/// Highest fragment total recognised in `(n/m)` fragment markers.
const MAX_FRAGMENTS: u32 = 7;

/// Marker vocabulary shared by every classification call.
///
/// Built once and handed to [`Classifier::new`](crate::core::classifier::Classifier::new);
/// the defaults reproduce the markers writers use when a game chat box forces
/// them to split a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerTables {
    /// Suffixes signalling that the post continues in a later message.
    pub continued_suffixes: Vec<String>,

    /// Prefixes signalling that the post continues an earlier message.
    pub continuation_prefixes: Vec<String>,

    /// Suffixes signalling a non-initial fragment, e.g. `2/3)`.
    pub continuation_suffixes: Vec<String>,

    /// Openers marking an out-of-character aside.
    pub ooc_openers: Vec<String>,

    /// Characters used to bookend emphasised words.
    pub emphasis_marks: Vec<char>,

    /// Anchored patterns removed from bodies before fragments are joined.
    ///
    /// Applied in order, repeatedly, until the body stops changing.
    pub strip_patterns: Vec<String>,
}

impl Default for MarkerTables {
    fn default() -> Self {
        let mut continued_suffixes: Vec<String> = [
            "...", "..", "…", "—", ">>", "cont", "cont.", "cont.)", "cont)", "-",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        // 1/2) .. 6/7): every fragment except the last one of its run
        for total in 2..=MAX_FRAGMENTS {
            for index in 1..total {
                continued_suffixes.push(format!("{index}/{total})"));
            }
        }

        // 2/2) .. 7/7): every fragment except the first one of its run
        let mut continuation_suffixes = Vec::new();
        for total in 2..=MAX_FRAGMENTS {
            for index in 2..=total {
                continuation_suffixes.push(format!("{index}/{total})"));
            }
        }

        Self {
            continued_suffixes,
            continuation_prefixes: ["...", "..", "…", "—", "-"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            continuation_suffixes,
            ooc_openers: ["[", "(", "{", "<"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            emphasis_marks: vec!['~', '_', '*', '/'],
            strip_patterns: [
                r"^ ?\. ?\. ?\. ?",
                r"^ ?\.\. ?",
                r"^ ?… ?",
                r"^ ?— ?",
                r"^ ?- ?",
                r" ?\. ?\. ?\. ?$",
                r" ?\.\. ?$",
                r" ?… ?$",
                r" ?— ?$",
                r" ?- ?$",
                r" ?>> ?$",
                r" ?\( ?\d+ ?/ ?[?\d]+ ?\) ?$",
                r"(?i) ?\(?\bcont(?:inued|\.)?\)? ?$",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

/// Where related images are looked for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSearch {
    /// Do not look for images.
    #[default]
    Disabled,
    /// Look in the directory containing the log file.
    NextToLog,
    /// Look in a specific directory.
    Directory(PathBuf),
}

impl ImageSearch {
    /// Resolves the directory to scan for a given log file.
    ///
    /// Returns `None` when the search is disabled.
    pub fn resolve(&self, log_path: &Path) -> Option<PathBuf> {
        match self {
            ImageSearch::Disabled => None,
            ImageSearch::NextToLog => Some(
                log_path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
            ),
            ImageSearch::Directory(dir) => Some(dir.clone()),
        }
    }
}

/// Switches for the reconstruction pipeline.
///
/// These are fixed once [`Pipeline::run`](crate::core::pipeline::Pipeline::run)
/// starts; no stage changes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Drop out-of-character asides (default: true)
    pub remove_out_of_character: bool,

    /// Stitch messages split across several log entries (default: true)
    pub combine_messages: bool,

    /// Replace abnormal silences with the typical pacing (default: true)
    pub squash_time_gaps: bool,

    /// Highlight ~emphasised~ words in rendered output (default: true)
    pub highlight_emphasis: bool,

    /// Colour used for highlighted words (default: `#DD9FC1`)
    pub emphasis_color: String,

    /// Where to look for images to attach to messages (default: disabled)
    pub image_search: ImageSearch,

    /// Messages shorter than this many characters are dropped while loading (default: 10)
    pub min_message_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            remove_out_of_character: true,
            combine_messages: true,
            squash_time_gaps: true,
            highlight_emphasis: true,
            emphasis_color: DEFAULT_EMPHASIS_COLOR.to_string(),
            image_search: ImageSearch::Disabled,
            min_message_length: DEFAULT_MIN_MESSAGE_LENGTH,
        }
    }
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if images should be correlated to messages.
    pub fn find_related_images(&self) -> bool {
        self.image_search != ImageSearch::Disabled
    }

    /// Sets whether OOC asides are removed.
    #[must_use]
    pub fn with_remove_out_of_character(mut self, enabled: bool) -> Self {
        self.remove_out_of_character = enabled;
        self
    }

    /// Sets whether split messages are combined.
    #[must_use]
    pub fn with_combine_messages(mut self, enabled: bool) -> Self {
        self.combine_messages = enabled;
        self
    }

    /// Sets whether abnormal gaps are squashed.
    #[must_use]
    pub fn with_squash_time_gaps(mut self, enabled: bool) -> Self {
        self.squash_time_gaps = enabled;
        self
    }

    /// Sets whether emphasis is highlighted.
    #[must_use]
    pub fn with_highlight_emphasis(mut self, enabled: bool) -> Self {
        self.highlight_emphasis = enabled;
        self
    }

    /// Sets the emphasis highlight colour.
    ///
    /// Accepts `#RGB`, `#RRGGBB`, or either without the leading `#`.
    pub fn with_emphasis_color(mut self, color: &str) -> Result<Self> {
        self.emphasis_color = normalize_hex_color(color)?;
        Ok(self)
    }

    /// Sets where images are searched for.
    #[must_use]
    pub fn with_image_search(mut self, search: ImageSearch) -> Self {
        self.image_search = search;
        self
    }

    /// Sets the minimum message length kept by the loader.
    #[must_use]
    pub fn with_min_message_length(mut self, length: usize) -> Self {
        self.min_message_length = length;
        self
    }
}

/// Validates a hex colour and returns it with a leading `#`.
///
/// # Example
///
/// ```rust
/// use rpformat::config::normalize_hex_color;
///
/// assert_eq!(normalize_hex_color("dd9fc1").unwrap(), "#dd9fc1");
/// assert_eq!(normalize_hex_color("#FFF").unwrap(), "#FFF");
/// assert!(normalize_hex_color("pink").is_err());
/// ```
pub fn normalize_hex_color(color: &str) -> Result<String> {
    let pattern = Regex::new("^#([a-fA-F0-9]{6}|[a-fA-F0-9]{3})$")?;
    let trimmed = color.trim();
    let candidate = if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{trimmed}")
    };

    if pattern.is_match(&candidate) {
        Ok(candidate)
    } else {
        Err(RpError::invalid_color(color))
    }
}

/// Persisted settings document.
///
/// Stored as pretty-printed JSON. Missing fields fall back to their defaults,
/// so older settings files keep loading as new options appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The log file to format
    pub log_file_path: Option<PathBuf>,

    /// Which kind of log the file is
    pub log_format: LogFormat,

    /// HTML template to fill (built-in template when absent)
    pub template_file_path: Option<PathBuf>,

    /// Where to write the result
    pub output_file_path: PathBuf,

    /// What to write
    pub output_format: OutputFormat,

    /// Pipeline switches
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_file_path: None,
            log_format: LogFormat::default(),
            template_file_path: None,
            output_file_path: PathBuf::from("formatted_writing.html"),
            output_format: OutputFormat::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Settings {
    /// Default settings file name, looked up in the working directory.
    pub const DEFAULT_FILE: &'static str = "rpformat.settings.json";

    /// Loads settings from `path`.
    ///
    /// A missing file is not an error: the defaults are returned instead.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings =
            serde_json::from_str(&content).map_err(|e| RpError::settings(path, e))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Writes settings to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| RpError::settings(path, e))?;
        fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "saved settings");
        Ok(())
    }
}
