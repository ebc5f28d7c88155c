//! The reconstruction pipeline.
//!
//! Stages run in a fixed order, each on the complete output of the one
//! before it:
//!
//! 1. continuation merging ([`merger`](crate::core::merger))
//! 2. OOC removal ([`filter`](crate::core::filter))
//! 3. gap detection and squashing ([`gaps`](crate::core::gaps))
//! 4. emphasis counting
//! 5. image correlation ([`images`](crate::core::images))
//!
//! # Example
//!
//! ```rust
//! use rpformat::config::PipelineConfig;
//! use rpformat::core::pipeline::Pipeline;
//! use rpformat::parser::{LogFormat, create_loader};
//!
//! let log = create_loader(LogFormat::Chat2, 10).load_str(r#"[
//!     {"OwnerId": "Alice", "SenderName": "Alice", "Message": "She reaches for the door...", "DateSent": "2024-03-01T20:00:00+00:00"},
//!     {"OwnerId": "Alice", "SenderName": "Alice", "Message": "and pulls it open.", "DateSent": "2024-03-01T20:01:00+00:00"},
//!     {"OwnerId": "Alice", "SenderName": "Bob", "Message": "(brb, doorbell)", "DateSent": "2024-03-01T20:02:00+00:00"}
//! ]"#)?;
//!
//! let output = Pipeline::new(PipelineConfig::new()).run(log, Vec::new());
//! assert_eq!(output.transcript.messages.len(), 1);
//! assert_eq!(output.transcript.messages[0].body, "She reaches for the door and pulls it open.");
//! assert_eq!(output.stats.combined, 1);
//! assert_eq!(output.stats.ooc_removed, 1);
//! # Ok::<(), rpformat::RpError>(())
//! ```

use std::path::Path;

use chrono::TimeDelta;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::core::classifier::Classifier;
use crate::core::filter::remove_out_of_character;
use crate::core::gaps::process_gaps;
use crate::core::images::{ImageCorrelation, ImageStats, correlate_images, discover_images};
use crate::core::merger::{classify_messages, combine_messages};
use crate::core::models::{ImageDescriptor, Transcript};
use crate::error::Result;
use crate::parser::{LogFormat, create_loader};

/// Statistics about a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    /// Entries handed over by the loader.
    pub loaded: usize,
    /// Entries the loader dropped.
    pub skipped: usize,
    /// Entries folded into an earlier message.
    pub combined: usize,
    /// Continuation chains that never completed.
    pub failed_continuations: usize,
    /// OOC messages removed.
    pub ooc_removed: usize,
    /// Messages in the finished transcript.
    pub messages: usize,
    /// Typical pause between messages.
    pub average_gap: TimeDelta,
    /// Abnormal silences found.
    pub gaps_found: usize,
    /// Time removed by squashing.
    pub time_squashed: TimeDelta,
    /// Messages whose emphasis will be highlighted.
    pub highlighted: usize,
    /// Image correlation counters.
    pub images: ImageStats,
}

impl ProcessingStats {
    /// Percentage of loaded entries that did not become their own message.
    pub fn reduction_ratio(&self) -> f64 {
        if self.loaded == 0 {
            return 0.0;
        }
        (1.0 - (self.messages as f64 / self.loaded as f64)) * 100.0
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The reconstructed session.
    pub transcript: Transcript,
    /// Images and the messages they belong to.
    pub images: ImageCorrelation,
    /// Run diagnostics.
    pub stats: ProcessingStats,
}

/// Runs the reconstruction stages with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    classifier: Classifier,
}

impl Pipeline {
    /// Creates a pipeline with the built-in marker tables.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_classifier(config, Classifier::standard())
    }

    /// Creates a pipeline with a custom classifier.
    pub fn with_classifier(config: PipelineConfig, classifier: Classifier) -> Self {
        Self { config, classifier }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads a log, finds images next to it if configured, and runs.
    pub fn process_file(&self, path: &Path, format: LogFormat) -> Result<PipelineOutput> {
        let log = create_loader(format, self.config.min_message_length).load(path)?;

        let images = match self.config.image_search.resolve(path) {
            Some(dir) => discover_images(&dir)?,
            None => Vec::new(),
        };

        Ok(self.run(log, images))
    }

    /// Runs every enabled stage over a loaded log.
    ///
    /// `images` is ignored unless image search is enabled.
    pub fn run(&self, log: crate::parser::LoadedLog, images: Vec<ImageDescriptor>) -> PipelineOutput {
        let mut stats = ProcessingStats {
            loaded: log.messages.len(),
            skipped: log.skipped,
            ..ProcessingStats::default()
        };
        let start = log.session.start;

        // 1. continuations
        let messages = if self.config.combine_messages {
            let outcome = combine_messages(&log.messages, start, &self.classifier);
            stats.combined = outcome.combined;
            stats.failed_continuations = outcome.failed;
            outcome.messages
        } else {
            classify_messages(&log.messages, start, &self.classifier)
        };

        // 2. OOC
        let messages = if self.config.remove_out_of_character {
            let (kept, removed) = remove_out_of_character(messages);
            stats.ooc_removed = removed;
            kept
        } else {
            messages
        };

        let mut transcript = Transcript::new(log.session, messages);

        // 3. gaps
        let (analysis, squashed) = process_gaps(&mut transcript, self.config.squash_time_gaps);
        stats.average_gap = analysis.average;
        stats.gaps_found = analysis.gaps.len();
        stats.time_squashed = squashed;

        // 4. emphasis
        if self.config.highlight_emphasis {
            stats.highlighted = transcript.messages.iter().filter(|m| m.has_emphasis).count();
        }

        // 5. images
        let correlation = if self.config.find_related_images() {
            correlate_images(&transcript.messages, &images)
        } else {
            if !images.is_empty() {
                warn!(count = images.len(), "image search disabled, ignoring images");
            }
            ImageCorrelation::default()
        };
        stats.images = correlation.stats;
        stats.messages = transcript.messages.len();

        info!(
            loaded = stats.loaded,
            messages = stats.messages,
            combined = stats.combined,
            ooc_removed = stats.ooc_removed,
            gaps = stats.gaps_found,
            images = stats.images.found,
            "pipeline complete"
        );

        PipelineOutput {
            transcript,
            images: correlation,
            stats,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
