//! Command-line interface definition using clap.
//!
//! Every flag is optional: values not given on the command line come from the
//! settings file (see [`Settings`]), and from the defaults after that.
//!
//! ```rust
//! use clap::Parser;
//! use rpformat::cli::Args;
//! use rpformat::config::Settings;
//!
//! let args = Args::try_parse_from(["rpformat", "session.json", "--no-squash", "-f", "json"]).unwrap();
//! let settings = args.apply(Settings::default()).unwrap();
//! assert!(!settings.pipeline.squash_time_gaps);
//! assert_eq!(settings.output_format.extension(), "json");
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{ImageSearch, Settings, normalize_hex_color};
use crate::error::Result;
use crate::format::OutputFormat;
use crate::parser::LogFormat;

/// Rebuild role-play chat logs into a readable HTML transcript.
#[derive(Parser, Debug, Clone)]
#[command(name = "rpformat")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    rpformat session.json
    rpformat session.json -o tonight.html --images
    rpformat export.json --source discord --keep-ooc
    rpformat session.json -f jsonl -o session.jsonl --no-squash
    rpformat session.json --template fancy.html --save-settings")]
pub struct Args {
    /// Path to the chat log (falls back to the settings file)
    pub log: Option<PathBuf>,

    /// Kind of log
    #[arg(short, long, value_enum)]
    pub source: Option<Source>,

    /// Path to output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (html, json, jsonl, csv)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// HTML template containing {{ authors }}, {{ metadata }} and {{ messages }}
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Keep out-of-character messages
    #[arg(long)]
    pub keep_ooc: bool,

    /// Do not stitch split messages together
    #[arg(long)]
    pub no_combine: bool,

    /// Report long silences without shortening them
    #[arg(long)]
    pub no_squash: bool,

    /// Leave emphasis marks unhighlighted
    #[arg(long)]
    pub no_emphasis: bool,

    /// Hex colour for highlighted words
    #[arg(long, value_name = "HEX")]
    pub emphasis_color: Option<String>,

    /// Attach images found next to the log
    #[arg(short, long)]
    pub images: bool,

    /// Attach images found in this directory
    #[arg(long, value_name = "DIR", conflicts_with = "images")]
    pub images_dir: Option<PathBuf>,

    /// Drop messages shorter than this many characters
    #[arg(long, value_name = "CHARS")]
    pub min_length: Option<usize>,

    /// Settings file to read
    #[arg(long, value_name = "FILE", default_value = Settings::DEFAULT_FILE)]
    pub settings: PathBuf,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save_settings: bool,

    /// Log every merge and gap decision
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Layers the flags over loaded settings.
    ///
    /// # Errors
    ///
    /// Returns [`RpError::InvalidColor`](crate::RpError::InvalidColor) for a
    /// malformed `--emphasis-color`.
    pub fn apply(&self, mut settings: Settings) -> Result<Settings> {
        if let Some(log) = &self.log {
            settings.log_file_path = Some(log.clone());
        }
        if let Some(source) = self.source {
            settings.log_format = source.into();
        }
        if let Some(output) = &self.output {
            settings.output_file_path = output.clone();
            // an explicit extension picks the format unless -f says otherwise
            if self.format.is_none() {
                if let Ok(format) = OutputFormat::from_path(&output.to_string_lossy()) {
                    settings.output_format = format;
                }
            }
        }
        if let Some(format) = self.format {
            settings.output_format = format;
        }
        if let Some(template) = &self.template {
            settings.template_file_path = Some(template.clone());
        }

        let pipeline = &mut settings.pipeline;
        if self.keep_ooc {
            pipeline.remove_out_of_character = false;
        }
        if self.no_combine {
            pipeline.combine_messages = false;
        }
        if self.no_squash {
            pipeline.squash_time_gaps = false;
        }
        if self.no_emphasis {
            pipeline.highlight_emphasis = false;
        }
        if let Some(color) = &self.emphasis_color {
            pipeline.emphasis_color = normalize_hex_color(color)?;
        }
        if self.images {
            pipeline.image_search = ImageSearch::NextToLog;
        }
        if let Some(dir) = &self.images_dir {
            pipeline.image_search = ImageSearch::Directory(dir.clone());
        }
        if let Some(length) = self.min_length {
            pipeline.min_message_length = length;
        }

        Ok(settings)
    }
}

/// Supported log sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Chat 2 plugin JSON log
    Chat2,

    /// DiscordChatExporter JSON export
    #[value(alias = "dc")]
    #[serde(alias = "dc")]
    Discord,
}

impl From<Source> for LogFormat {
    fn from(source: Source) -> Self {
        match source {
            Source::Chat2 => LogFormat::Chat2,
            Source::Discord => LogFormat::Discord,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", LogFormat::from(*self))
    }
}
