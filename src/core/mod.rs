//! Core reconstruction logic.
//!
//! This module contains:
//! - [`classifier`] - marker predicates over message bodies
//! - [`merger`] - stitching split messages back together
//! - [`filter`] - dropping out-of-character asides
//! - [`gaps`] - finding and squashing abnormal silences
//! - [`images`] - attaching screenshots to messages
//! - [`markup`] - text transforms used by loaders and the HTML writer
//! - [`models`] - session, transcript and image types
//! - [`pipeline`] - all of the above, in order
//! - [`output`] - HTML, JSON, JSONL and CSV writers
//!
//! # Quick Start
//!
//! ```rust
//! use rpformat::core::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::new().with_squash_time_gaps(false));
//! assert!(!pipeline.config().squash_time_gaps);
//! ```

pub mod classifier;
pub mod filter;
pub mod gaps;
pub mod images;
pub mod markup;
pub mod merger;
pub mod models;
pub mod output;
pub mod pipeline;

pub use crate::config::PipelineConfig;
pub use classifier::{Classification, Classifier};
pub use filter::remove_out_of_character;
pub use gaps::{GapAnalysis, detect_gaps, process_gaps, squash_gaps};
pub use images::{ImageCorrelation, ImageStats, correlate_images, discover_images, encode_images};
pub use merger::{MergeOutcome, classify_messages, combine_messages};
pub use models::{Gap, ImageDescriptor, RelatedImage, Session, Transcript};
pub use pipeline::{Pipeline, PipelineOutput, ProcessingStats};
