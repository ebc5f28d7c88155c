//! # rpformat
//!
//! A Rust library for turning role-play chat logs into readable transcripts.
//!
//! ## Overview
//!
//! Game chat splits long posts across several lines, mixes in
//! out-of-character asides, and records every bathroom break as dead air.
//! rpformat reconstructs what the writers meant:
//!
//! - **Continuation merging** - `She opens the door...` + `...and steps inside.`
//!   becomes one message
//! - **OOC filtering** - `(brb)` and friends are dropped
//! - **Gap squashing** - a six-hour pause is reported and replaced by the
//!   typical pacing, so "time into session" stays meaningful
//! - **Image correlation** - screenshots are attached to the message they
//!   were taken during, by file name timestamp, file time, or an explicit id
//!
//! Supported logs are the Chat 2 plugin's JSON and DiscordChatExporter JSON.
//! Output is HTML (template driven), JSON, JSONL or CSV.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rpformat::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = PipelineConfig::new().with_image_search(ImageSearch::NextToLog);
//!     let output = Pipeline::new(config).process_file("session.json".as_ref(), LogFormat::Chat2)?;
//!
//!     let images = encode_images(&output.images.assignments)?;
//!     HtmlWriter::new().write(&output.transcript, &images, "session.html")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`parser`] - [`LogSource`](parser::LogSource) trait, [`LogFormat`](parser::LogFormat), [`create_loader`](parser::create_loader)
//! - [`parsers`] - [`Chat2Loader`](parsers::Chat2Loader), [`DiscordLoader`](parsers::DiscordLoader)
//! - [`config`] - [`PipelineConfig`](config::PipelineConfig), [`MarkerTables`](config::MarkerTables), [`Settings`](config::Settings)
//! - [`core`] - the reconstruction stages and writers
//!   - [`core::pipeline`] - [`Pipeline`](core::pipeline::Pipeline), [`ProcessingStats`](core::pipeline::ProcessingStats)
//!   - [`core::merger`], [`core::filter`], [`core::gaps`], [`core::images`]
//!   - [`core::output`] - [`HtmlWriter`](core::output::HtmlWriter), JSON/JSONL/CSV writers
//! - [`message`] - [`RawMessage`], [`LogicalMessage`]
//! - [`format`] - [`OutputFormat`](format::OutputFormat), [`write_to_format`](format::write_to_format)
//! - [`error`] - [`RpError`], [`Result`]
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod message;
pub mod parser;
pub mod parsers;

// Re-export the main types at the crate root for convenience
pub use error::{Result, RpError};
pub use message::{LogicalMessage, MergeStatus, RawMessage};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use rpformat::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{LogicalMessage, MergeStatus, RawMessage};

    pub use crate::error::{Result, RpError};

    pub use crate::parser::{LoadedLog, LogFormat, LogSource, create_loader};

    pub use crate::config::{ImageSearch, MarkerTables, PipelineConfig, Settings};

    pub use crate::core::classifier::Classifier;
    pub use crate::core::images::{correlate_images, discover_images, encode_images};
    pub use crate::core::models::{RelatedImage, Session, Transcript};
    pub use crate::core::pipeline::{Pipeline, PipelineOutput, ProcessingStats};

    pub use crate::core::output::{HtmlWriter, to_json, to_jsonl, write_json, write_jsonl};
    #[cfg(feature = "csv-output")]
    pub use crate::core::output::{to_csv, write_csv};

    pub use crate::format::{OutputFormat, write_to_format};
}
