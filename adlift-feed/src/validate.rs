//! Structural validation of a built feed document.
//!
//! Validation is pure: it never mutates the document and never touches
//! storage. All violations are accumulated in a single pass rather than
//! short-circuiting, and each carries the offending entry's position so a
//! caller can pinpoint bad rows in a bulk submission.

use crate::document::{FeedDocument, FEED_ROOT_TAG};

/// One structural violation found in a feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Index of the offending entry in the document's sequence; `None` for
    /// document-level violations.
    pub entry_index: Option<usize>,
    /// The field or attribute the violation concerns.
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.entry_index {
            Some(idx) => write!(f, "ad {}: {}", idx, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Violation {
    fn document(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            entry_index: None,
            field,
            message: message.into(),
        }
    }

    fn entry(index: usize, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            entry_index: Some(index),
            field,
            message: message.into(),
        }
    }
}

/// Check every structural invariant of `doc` and return all violations.
///
/// An empty result means the document is valid. The happy path of the
/// submission service never produces violations because required fields are
/// enforced at the request boundary; this is the defensive check before
/// anything reaches storage.
pub fn validate(doc: &FeedDocument) -> Vec<Violation> {
    let mut violations = Vec::new();

    if doc.root_tag() != FEED_ROOT_TAG {
        violations.push(Violation::document(
            "root",
            format!(
                "root element must be '{}', found '{}'",
                FEED_ROOT_TAG,
                doc.root_tag()
            ),
        ));
    }
    if doc.format_version().is_empty() {
        violations.push(Violation::document(
            "formatVersion",
            "missing 'formatVersion' attribute",
        ));
    }
    if doc.target().is_empty() {
        violations.push(Violation::document("target", "missing 'target' attribute"));
    }

    for (index, entry) in doc.entries().iter().enumerate() {
        if entry.title().is_empty() {
            violations.push(Violation::entry(index, "Title", "missing required field: Title"));
        }
        if entry.description().is_empty() {
            violations.push(Violation::entry(
                index,
                "Description",
                "missing required field: Description",
            ));
        }
        if entry.price().is_empty() {
            violations.push(Violation::entry(index, "Price", "missing required field: Price"));
        }
    }

    violations
}
