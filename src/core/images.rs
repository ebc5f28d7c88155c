//! Finding screenshots and attaching each to the message it depicts.
//!
//! Screenshot tools (GShade, ReShade) name their files after the moment of
//! capture, e.g. `ffxiv_dx11 2024-03-01 21-05-33.png`. The correlator reads
//! that timestamp (or the file modification time when there is none) and
//! picks the last message sent before it. A file named after a message id,
//! e.g. `7_snapshot.png`, is attached to that message directly.
//!
//! Each message receives at most one image. When the target is taken, the
//! image goes to the next free message after the most recently assigned one.
//!
//! # Example
//!
//! ```rust
//! use std::path::PathBuf;
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use rpformat::RawMessage;
//! use rpformat::LogicalMessage;
//! use rpformat::core::images::{correlate_images, describe_file_name};
//!
//! let start = Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap();
//! let messages: Vec<LogicalMessage> = (0..3)
//!     .map(|i| {
//!         let raw = RawMessage::new("Alice", "a line of text", start + TimeDelta::minutes(i * 10));
//!         LogicalMessage::from_raw(i as u64 + 1, &raw, start)
//!     })
//!     .collect();
//!
//! let image = describe_file_name(PathBuf::from("ffxiv 2024-03-01 21-15-00.png"), start);
//! let result = correlate_images(&messages, &[image]);
//! assert_eq!(result.assignments[0].related_message_id, 2);
//! assert_eq!(result.stats.by_timestamp, 1);
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::core::models::{ImageDescriptor, RelatedImage};
use crate::error::Result;
use crate::message::LogicalMessage;

/// File extensions treated as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Longest explicit message id read from a file name, in digits.
const MAX_ID_DIGITS: usize = 4;

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{4}).(\d{1,2}).(\d{1,2})[^\d]+(\d{1,2}).(\d{1,2})[^.]?(\d{2})?")
            .expect("valid screenshot timestamp regex")
    })
}

/// How an image found its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentMethod {
    /// The file name starts with a message id.
    Manual,
    /// Correlated by the timestamp in the file name.
    FileNameTimestamp,
    /// Correlated by the file modification time.
    FileTime,
    /// Newer than every message, or older than all of them: given to the
    /// first message without an image.
    Fallback,
}

/// An image and the message it was attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAssignment {
    /// Where the file lives.
    pub image_path: PathBuf,
    /// Id of the message it belongs to.
    pub related_message_id: u64,
    /// How the message was chosen.
    pub method: AssignmentMethod,
    /// The first choice was taken, so the image moved further down.
    pub pushed_down: bool,
}

/// Counters describing a correlation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageStats {
    /// Images considered.
    pub found: usize,
    /// Assigned by an id in the file name.
    pub manually: usize,
    /// Assigned by a timestamp in the file name.
    pub by_timestamp: usize,
    /// Assigned by file modification time.
    pub by_file_time: usize,
    /// Assigned to the first free message.
    pub randomly: usize,
    /// Moved past a message that already had an image.
    pub pushed_down: usize,
    /// Could not be assigned at all.
    pub unresolved: usize,
}

/// Outcome of correlating a set of images to a transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCorrelation {
    /// Assignments in image processing order.
    pub assignments: Vec<ImageAssignment>,
    /// Images that found no message.
    pub unresolved: Vec<PathBuf>,
    /// Run diagnostics.
    pub stats: ImageStats,
}

// ============================================================================
// Discovery
// ============================================================================

/// Lists image files in `dir`, sorted by file name.
pub fn discover_images(dir: &Path) -> Result<Vec<ImageDescriptor>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let images = paths
        .into_iter()
        .map(describe_image)
        .collect::<Result<Vec<_>>>()?;

    debug!(dir = %dir.display(), count = images.len(), "discovered images");
    Ok(images)
}

/// Returns `true` if the path has an image extension.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Reads an image's modification time and describes it.
pub fn describe_image(path: PathBuf) -> Result<ImageDescriptor> {
    let modified: DateTime<Utc> = fs::metadata(&path)?.modified()?.into();
    Ok(describe_file_name(path, modified))
}

/// Describes an image from its file name, with `modified` as the fallback
/// timestamp.
pub fn describe_file_name(path: PathBuf, modified: DateTime<Utc>) -> ImageDescriptor {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (extracted_timestamp, remainder) = match extract_timestamp(&name) {
        Some(timestamp) => (
            Some(timestamp),
            timestamp_regex().replace_all(&name, "").into_owned(),
        ),
        None => (None, name),
    };

    ImageDescriptor {
        explicit_message_id: explicit_message_id(&remainder),
        path,
        extracted_timestamp,
        fallback_timestamp: modified,
    }
}

/// Reads a capture timestamp from a file name, taken as UTC.
///
/// Returns `None` when there is no timestamp, when it names an impossible
/// date, or when its year is not after 1970.
pub fn extract_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    let caps = timestamp_regex().captures(file_name)?;
    let number = |caps: &Captures, i: usize| -> Option<u32> {
        caps.get(i).and_then(|m| m.as_str().parse().ok())
    };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let seconds = number(&caps, 6).unwrap_or(0);
    let timestamp = NaiveDate::from_ymd_opt(year, number(&caps, 2)?, number(&caps, 3)?)?
        .and_hms_opt(number(&caps, 4)?, number(&caps, 5)?, seconds)?
        .and_utc();

    (timestamp.year() > 1970).then_some(timestamp)
}

/// Reads up to four leading digits as a message id.
///
/// Message ids start at 1, so a zero id is not an id.
pub fn explicit_message_id(file_name: &str) -> Option<u64> {
    let digits: String = file_name
        .chars()
        .take_while(char::is_ascii_digit)
        .take(MAX_ID_DIGITS)
        .collect();
    digits.parse().ok().filter(|&id| id != 0)
}

// ============================================================================
// Correlation
// ============================================================================

/// Id of the last message sent before `time`.
///
/// `None` when the first message is already at or after `time`, or when no
/// message is.
pub fn message_by_time(messages: &[LogicalMessage], time: DateTime<Utc>) -> Option<u64> {
    let mut last = None;
    for message in messages {
        if message.sent_at >= time {
            return last;
        }
        last = Some(message.id);
    }
    None
}

/// Message ids that already carry an image.
#[derive(Debug, Default)]
struct Claims {
    taken: BTreeSet<u64>,
    last: Option<u64>,
}

impl Claims {
    /// Claims `target`, or the first free message id after the last claim.
    ///
    /// A moved image only lands on ids in `live`. When nothing is free after
    /// the last claim it takes the earliest free message instead. Returns the
    /// id claimed and whether it moved, or `None` when every message is taken.
    fn claim(&mut self, target: u64, live: &BTreeSet<u64>) -> Option<(u64, bool)> {
        if !self.taken.contains(&target) {
            self.taken.insert(target);
            self.last = Some(target);
            return Some((target, false));
        }

        let from = self.last.map_or(target, |last| last + 1);
        let id = live
            .range(from..)
            .chain(live.range(..from))
            .copied()
            .find(|id| !self.taken.contains(id))?;
        self.taken.insert(id);
        self.last = Some(id);
        Some((id, true))
    }

    fn first_free(&self, messages: &[LogicalMessage]) -> Option<u64> {
        messages
            .iter()
            .map(|m| m.id)
            .find(|id| !self.taken.contains(id))
    }
}

/// Attaches each image to one message.
///
/// Images are handled in the order given. Every image either ends up in
/// [`ImageCorrelation::assignments`] or in [`ImageCorrelation::unresolved`].
pub fn correlate_images(messages: &[LogicalMessage], images: &[ImageDescriptor]) -> ImageCorrelation {
    let mut result = ImageCorrelation::default();
    let mut claims = Claims::default();
    let live: BTreeSet<u64> = messages.iter().map(|m| m.id).collect();

    for image in images {
        result.stats.found += 1;

        let (target, method) = if let Some(id) = image.explicit_message_id {
            (Some(id), AssignmentMethod::Manual)
        } else {
            match message_by_time(messages, image.best_timestamp()) {
                Some(id) if image.extracted_timestamp.is_some() => {
                    (Some(id), AssignmentMethod::FileNameTimestamp)
                }
                Some(id) => (Some(id), AssignmentMethod::FileTime),
                None => (claims.first_free(messages), AssignmentMethod::Fallback),
            }
        };

        let claimed = target.and_then(|t| claims.claim(t, &live).map(|c| (t, c)));
        let Some((target, (id, pushed_down))) = claimed else {
            warn!(image = %image.path.display(), "no message left for image");
            result.stats.unresolved += 1;
            result.unresolved.push(image.path.clone());
            continue;
        };

        match method {
            AssignmentMethod::Manual => {
                if !live.contains(&target) {
                    warn!(
                        image = %image.path.display(),
                        message_id = target,
                        "no message with this id, image goes at the end"
                    );
                }
                result.stats.manually += 1;
            }
            AssignmentMethod::FileNameTimestamp => result.stats.by_timestamp += 1,
            AssignmentMethod::FileTime => result.stats.by_file_time += 1,
            AssignmentMethod::Fallback => {
                warn!(
                    image = %image.path.display(),
                    message_id = target,
                    "image time outside the session, using first free message"
                );
                result.stats.randomly += 1;
            }
        }

        if pushed_down {
            debug!(image = %image.path.display(), from = target, to = id, "image pushed down");
            result.stats.pushed_down += 1;
        }

        result.assignments.push(ImageAssignment {
            image_path: image.path.clone(),
            related_message_id: id,
            method,
            pushed_down,
        });
    }

    info!(
        found = result.stats.found,
        manually = result.stats.manually,
        by_timestamp = result.stats.by_timestamp,
        by_file_time = result.stats.by_file_time,
        randomly = result.stats.randomly,
        pushed_down = result.stats.pushed_down,
        "images correlated"
    );

    result
}

/// Reads and encodes the assigned images, keeping their order.
pub fn encode_images(assignments: &[ImageAssignment]) -> Result<Vec<RelatedImage>> {
    assignments
        .iter()
        .map(|a| RelatedImage::encode(&a.image_path, a.related_message_id))
        .collect()
}
