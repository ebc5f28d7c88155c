//! Stitching split posts back together.
//!
//! A single forward pass over the log. When an entry looks continued, the
//! merger starts accumulating: following entries are appended while they come
//! from the same author or look like a later fragment. The chain completes at
//! the first appended entry that does not itself look continued.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use rpformat::RawMessage;
//! use rpformat::core::classifier::Classifier;
//! use rpformat::core::merger::combine_messages;
//!
//! let t = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
//! let raw = vec![
//!     RawMessage::new("Alice", "Hello...", t),
//!     RawMessage::new("Alice", "World", t),
//! ];
//!
//! let outcome = combine_messages(&raw, t, &Classifier::standard());
//! assert_eq!(outcome.messages.len(), 1);
//! assert_eq!(outcome.messages[0].body, "Hello World");
//! assert_eq!(outcome.combined, 1);
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::classifier::Classifier;
use crate::message::{LogicalMessage, MergeStatus, RawMessage};

/// Result of a merge pass.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Logical messages in log order, ids `1..=k`.
    pub messages: Vec<LogicalMessage>,

    /// Number of log entries folded into an earlier one.
    pub combined: usize,

    /// Number of chains that looked continued but never completed.
    pub failed: usize,
}

/// An open continuation chain.
struct Chain {
    origin: LogicalMessage,
    author: String,
    body: String,
    fragments: usize,
}

enum State {
    Idle,
    Seeking(Chain),
}

/// Marks the end of the log, flushing any open chain.
enum Incoming {
    Message(LogicalMessage),
    EndOfStream,
}

/// Classifies raw entries without combining them.
///
/// Bodies keep their markers; ids run `1..=n` in log order.
pub fn classify_messages(
    raw: &[RawMessage],
    session_start: DateTime<Utc>,
    classifier: &Classifier,
) -> Vec<LogicalMessage> {
    raw.iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut message = LogicalMessage::from_raw(index as u64 + 1, entry, session_start);
            apply_classification(&mut message, classifier);
            if message.is_continued {
                message.merge_status = MergeStatus::Continued;
            }
            message
        })
        .collect()
}

/// Combines split posts into logical messages.
///
/// Every entry is classified on its raw body, then its continuation marks are
/// stripped. A chain that never completes is emitted rather than dropped: on
/// its own it keeps [`MergeStatus::Continued`]; if fragments were already
/// folded into it, the accumulated text is kept and it counts as combined.
/// Either way it is counted in [`MergeOutcome::failed`].
pub fn combine_messages(
    raw: &[RawMessage],
    session_start: DateTime<Utc>,
    classifier: &Classifier,
) -> MergeOutcome {
    let mut merger = Merger::default();

    let incoming = raw
        .iter()
        .map(|entry| {
            let mut message = LogicalMessage::from_raw(0, entry, session_start);
            apply_classification(&mut message, classifier);
            message.set_body(classifier.strip_continuation_marks(&message.body));
            Incoming::Message(message)
        })
        .chain(std::iter::once(Incoming::EndOfStream));

    for item in incoming {
        merger.feed(item);
    }

    let mut messages = merger.emitted;
    for (index, message) in messages.iter_mut().enumerate() {
        message.id = index as u64 + 1;
        // fragment tags such as (1/2) are gone, so look again
        message.has_emphasis = classifier.has_emphasis_markers(&message.body);
    }

    debug!(
        input = raw.len(),
        output = messages.len(),
        combined = merger.combined,
        failed = merger.failed,
        "merge pass complete"
    );

    MergeOutcome {
        messages,
        combined: merger.combined,
        failed: merger.failed,
    }
}

fn apply_classification(message: &mut LogicalMessage, classifier: &Classifier) {
    let flags = classifier.classify(&message.body);
    message.is_continued = flags.continued;
    message.is_continuation_of_previous = flags.continuation_of_previous;
    message.is_out_of_character = flags.out_of_character;
    message.has_emphasis = flags.emphasis;
}

#[derive(Default)]
struct Merger {
    state: Option<Chain>,
    emitted: Vec<LogicalMessage>,
    combined: usize,
    failed: usize,
}

impl Merger {
    fn feed(&mut self, item: Incoming) {
        let state = match self.state.take() {
            Some(chain) => State::Seeking(chain),
            None => State::Idle,
        };

        match (state, item) {
            (State::Idle, Incoming::EndOfStream) => {}
            (State::Idle, Incoming::Message(message)) => self.start_or_emit(message),
            (State::Seeking(chain), Incoming::EndOfStream) => self.fail(chain),
            (State::Seeking(mut chain), Incoming::Message(message)) => {
                if message.author == chain.author || message.is_continuation_of_previous {
                    debug!(
                        origin = %preview(&chain.body),
                        fragment = %preview(&message.body),
                        "appending fragment"
                    );
                    chain.body.push(' ');
                    chain.body.push_str(&message.body);
                    chain.fragments += 1;
                    self.combined += 1;

                    if message.is_continued {
                        self.state = Some(chain);
                    } else {
                        self.complete(chain);
                    }
                } else {
                    self.fail(chain);
                    self.start_or_emit(message);
                }
            }
        }
    }

    fn start_or_emit(&mut self, message: LogicalMessage) {
        if message.is_continued {
            debug!(origin = %preview(&message.body), author = %message.author, "seeking continuation");
            self.state = Some(Chain {
                author: message.author.clone(),
                body: message.body.clone(),
                origin: message,
                fragments: 0,
            });
        } else {
            self.emitted.push(message);
        }
    }

    fn complete(&mut self, chain: Chain) {
        let mut origin = chain.origin;
        origin.set_body(chain.body);
        origin.is_continued = false;
        origin.merge_status = MergeStatus::CombinedResult;
        debug!(
            fragments = chain.fragments + 1,
            words = origin.word_count,
            "continuation complete"
        );
        self.emitted.push(origin);
    }

    fn fail(&mut self, chain: Chain) {
        self.failed += 1;
        let mut origin = chain.origin;
        if chain.fragments > 0 {
            origin.set_body(chain.body);
            origin.merge_status = MergeStatus::CombinedResult;
        } else {
            origin.merge_status = MergeStatus::Continued;
        }
        debug!(origin = %preview(&origin.body), "failed to find continuation");
        self.emitted.push(origin);
    }
}

/// First few words of a body, for log lines.
fn preview(body: &str) -> String {
    body.split_whitespace().take(5).collect::<Vec<_>>().join(" ")
}
