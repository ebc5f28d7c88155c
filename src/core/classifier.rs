//! Marker-based classification of message bodies.
//!
//! Game chat boxes cap message length, so writers split long posts and mark
//! the seams: a trailing `...` or `(1/3)` on one entry, a leading `...` or a
//! trailing `(2/3)` on the next. The [`Classifier`] recognises those seams,
//! out-of-character asides and emphasis marks, and strips the seams before
//! fragments are joined.
//!
//! # Example
//!
//! ```rust
//! use rpformat::core::classifier::Classifier;
//!
//! let classifier = Classifier::standard();
//!
//! assert!(classifier.looks_continued("She turned toward the door..."));
//! assert!(classifier.looks_like_continuation_of("...and stepped outside."));
//! assert!(classifier.looks_out_of_character("(brb, dinner)"));
//! assert_eq!(classifier.strip_continuation_marks("...and stepped outside (2/2)"), "and stepped outside");
//! ```

use regex::Regex;

use crate::config::MarkerTables;
use crate::error::Result;

/// Everything the classifier knows about one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    /// Ends with a continuation marker.
    pub continued: bool,
    /// Starts or ends like a later fragment.
    pub continuation_of_previous: bool,
    /// Opens with a bracket.
    pub out_of_character: bool,
    /// Contains an emphasis mark.
    pub emphasis: bool,
}

/// Classifies message bodies against a fixed set of [`MarkerTables`].
///
/// Strip patterns are compiled once, on construction.
#[derive(Debug, Clone)]
pub struct Classifier {
    tables: MarkerTables,
    strip_patterns: Vec<Regex>,
}

impl Classifier {
    /// Creates a classifier, compiling the tables' strip patterns.
    pub fn new(tables: MarkerTables) -> Result<Self> {
        let strip_patterns = tables
            .strip_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            tables,
            strip_patterns,
        })
    }

    /// Creates a classifier over the built-in marker tables.
    pub fn standard() -> Self {
        Self::new(MarkerTables::default()).expect("built-in marker patterns compile")
    }

    /// Returns the marker tables in use.
    pub fn tables(&self) -> &MarkerTables {
        &self.tables
    }

    /// Returns `true` if the body ends with a continuation marker.
    ///
    /// The body has to be longer than every marker in the table, so a body
    /// made of nothing but `...` is not a continuation.
    pub fn looks_continued(&self, body: &str) -> bool {
        ends_with_any(body, &self.tables.continued_suffixes)
    }

    /// Returns `true` if the body starts like a later fragment (`...`, `-`)
    /// or ends with a non-initial fragment tag such as `2/3)`.
    pub fn looks_like_continuation_of(&self, body: &str) -> bool {
        starts_with_any(body, &self.tables.continuation_prefixes)
            || ends_with_any(body, &self.tables.continuation_suffixes)
    }

    /// Returns `true` if the body opens with a bracket.
    pub fn looks_out_of_character(&self, body: &str) -> bool {
        starts_with_any(body, &self.tables.ooc_openers)
    }

    /// Returns `true` if the body contains any emphasis mark.
    pub fn has_emphasis_markers(&self, body: &str) -> bool {
        body.chars().any(|c| self.tables.emphasis_marks.contains(&c))
    }

    /// Removes continuation markers from both ends of the body.
    ///
    /// Patterns are re-applied until nothing changes, so stacked markers such
    /// as `... (2/3)` are removed together.
    pub fn strip_continuation_marks(&self, body: &str) -> String {
        let mut current = body.trim().to_string();
        loop {
            let mut next = current.clone();
            for re in &self.strip_patterns {
                next = re.replace(&next, "").into_owned();
            }
            let next = next.trim().to_string();
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Runs every predicate over the body.
    pub fn classify(&self, body: &str) -> Classification {
        Classification {
            continued: self.looks_continued(body),
            continuation_of_previous: self.looks_like_continuation_of(body),
            out_of_character: self.looks_out_of_character(body),
            emphasis: self.has_emphasis_markers(body),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}

/// Matches `markers` against the trimmed body, then once more with all
/// whitespace removed if the body has any.
///
/// Text no longer than the longest marker never matches.
fn matches_any(body: &str, markers: &[String], hit: impl Fn(&str, &str) -> bool) -> bool {
    let longest = markers.iter().map(|m| m.chars().count()).max().unwrap_or(0);
    let check = |text: &str| text.chars().count() > longest && markers.iter().any(|m| hit(text, m));

    let trimmed = body.trim();
    if check(trimmed) {
        return true;
    }

    if trimmed.chars().any(char::is_whitespace) {
        let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        return check(&compact);
    }

    false
}

fn ends_with_any(body: &str, markers: &[String]) -> bool {
    matches_any(body, markers, |text, m| text.ends_with(m))
}

fn starts_with_any(body: &str, markers: &[String]) -> bool {
    matches_any(body, markers, |text, m| text.starts_with(m))
}
