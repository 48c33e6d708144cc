//! Status vocabulary for board tasks.
//!
//! Every status token a caller can send (aliases, canonical labels, board
//! column names) resolves to a [`Status`] with a display label and glyph.
//! Resolution is total: unknown tokens survive as uppercased labels.

use std::fmt;

use serde::{Serialize, Serializer};

/// Glyph used for planned tasks and for any unrecognized status.
pub const DEFAULT_GLYPH: &str = "📋";

/// Glyphs that may appear in front of a status label in existing documents.
///
/// Includes glyphs the vocabulary never emits, so hand-written suffixes such
/// as `⏸️ PAUSED` are still recognized when rewriting a header.
pub const KNOWN_GLYPHS: [&str; 9] = ["📋", "🔄", "👀", "✅", "⏳", "🕐", "🚧", "⏸️", "⏸"];

/// Labels recognized inside an existing status suffix.
pub const KNOWN_LABELS: [&str; 10] = [
    "PLANNED",
    "TODO",
    "IN PROGRESS",
    "IN REVIEW",
    "REVIEW",
    "MONITORING",
    "DONE",
    "COMPLETE",
    "PENDING",
    "PAUSED",
];

/// Canonical task lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    Planned,
    InProgress,
    InReview,
    Monitoring,
    Done,
    /// Unrecognized input, kept uppercased.
    Other(String),
}

impl Status {
    /// Resolve any status token, case-insensitively.
    pub fn resolve(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "todo" | "planned" => Status::Planned,
            "in-progress" | "in_progress" | "in progress" => Status::InProgress,
            "review" | "in review" | "in-review" | "in_review" => Status::InReview,
            "monitoring" => Status::Monitoring,
            "done" | "complete" | "completed" => Status::Done,
            _ => Status::Other(input.trim().to_uppercase()),
        }
    }

    /// Display label, e.g. `IN PROGRESS`.
    pub fn label(&self) -> &str {
        match self {
            Status::Planned => "PLANNED",
            Status::InProgress => "IN PROGRESS",
            Status::InReview => "IN REVIEW",
            Status::Monitoring => "MONITORING",
            Status::Done => "DONE",
            Status::Other(label) => label,
        }
    }

    /// Display glyph, e.g. `🔄`.
    pub fn glyph(&self) -> &'static str {
        match self {
            Status::Planned => DEFAULT_GLYPH,
            Status::InProgress => "🔄",
            Status::InReview | Status::Monitoring => "👀",
            Status::Done => "✅",
            Status::Other(_) => DEFAULT_GLYPH,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Status::Done)
    }

    /// `glyph label`, the form used in detail lines and header suffixes.
    pub fn display(&self) -> String {
        format!("{} {}", self.glyph(), self.label())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Map a board column name to the status token it stands for.
///
/// Unknown column names pass through unchanged.
pub fn column_status(column: &str) -> &str {
    match column {
        "todo" => "PLANNED",
        "in-progress" => "IN_PROGRESS",
        "review" => "IN REVIEW",
        "done" => "DONE",
        other => other,
    }
}

/// Strip a leading known glyph (and following whitespace) from `text`.
pub(crate) fn strip_glyph(text: &str) -> Option<&str> {
    KNOWN_GLYPHS
        .iter()
        .find_map(|glyph| text.strip_prefix(glyph))
        .map(|rest| rest.trim_start_matches('\u{FE0F}').trim_start())
}

/// Strip a trailing known glyph from `text`.
pub(crate) fn strip_trailing_glyph(text: &str) -> Option<&str> {
    let text = text.trim_end_matches('\u{FE0F}');
    KNOWN_GLYPHS
        .iter()
        .find_map(|glyph| text.strip_suffix(glyph.trim_end_matches('\u{FE0F}')))
}

/// True if `text` is a status label the vocabulary or older documents use.
pub(crate) fn is_known_label(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    KNOWN_LABELS.contains(&upper.as_str())
        || !matches!(Status::resolve(text), Status::Other(_))
}
