//! Property updater: rewrite the lines that encode a task property.
//!
//! Rewrites are computed per located line and spliced back into the
//! document; every other line is copied through untouched. Applying the same
//! update twice yields the same text as applying it once.
//!
//! Canonical renderings:
//!
//! | representation | status (not done)              | status done                       |
//! |----------------|--------------------------------|-----------------------------------|
//! | header         | `### ID: Title (🔄 IN PROGRESS)` | `### ~~ID~~: Title (✅ DONE)`      |
//! | table row      | `\| **ID** \| 🔄 **IN PROGRESS** \|` | `\| ~~**ID**~~ \| ✅ **DONE** \|` |
//! | status detail  | `**Status**: 🔄 IN PROGRESS`    | `**Status**: ✅ DONE`              |

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::locate::{locate, TaskLocation};
use crate::scanner::{self, parse_task_header, strip_cr};
use crate::status::{self, Status, KNOWN_LABELS};

/// Task property that can be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Property {
    Status,
    Priority,
}

impl FromStr for Property {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "status" => Ok(Property::Status),
            "priority" => Ok(Property::Priority),
            "" => Err(Error::MissingValue("property")),
            _ => Err(Error::UnknownProperty(s.to_string())),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Status => f.write_str("status"),
            Property::Priority => f.write_str("priority"),
        }
    }
}

/// Result of applying an update to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// New document text (equal to the input when nothing changed).
    pub text: String,
    /// Text differs from the input.
    pub changed: bool,
    /// Representations found for the task.
    pub location: TaskLocation,
}

/// Apply `property = value` to every representation of `task_id`.
///
/// A value rejected by [`check_value`] leaves the document unchanged.
pub fn apply(text: &str, task_id: &str, property: Property, value: &str) -> Update {
    if check_value(value, "value").is_err() {
        debug!(task_id, %property, "value cannot be written inline; skipping");
        return Update {
            text: text.to_string(),
            changed: false,
            location: locate(text, task_id),
        };
    }
    match property {
        Property::Status => apply_status(text, task_id, &Status::resolve(value)),
        Property::Priority => apply_priority(text, task_id, value.trim()),
    }
}

/// Reject values that would break the line or cell they are written into.
///
/// Line breaks would add lines to the document and `|` would add table
/// cells; other control characters are refused along with them.
pub fn check_value<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    if value.contains('|') {
        return Err(Error::InvalidArgument(format!("{name} cannot contain '|'")));
    }
    if value.chars().any(|ch| ch.is_control() && ch != '\t') {
        return Err(Error::InvalidArgument(format!("{name} must be a single line")));
    }
    Ok(value)
}

/// Rewrite the status of `task_id` in its header, table row and status detail.
pub fn apply_status(text: &str, task_id: &str, status: &Status) -> Update {
    let location = locate(text, task_id);
    debug!(task_id, status = %status, ?location, "applying status");

    splice(text, location, |index, line| {
        if Some(index) == location.table {
            rewrite_table_status(line, task_id, status)
        } else if Some(index) == location.header {
            rewrite_header(line, status)
        } else if Some(index) == location.status_detail {
            rewrite_field(line, "Status", &status.display())
        } else {
            None
        }
    })
}

/// Rewrite the priority of `task_id` in its table row and priority detail.
pub fn apply_priority(text: &str, task_id: &str, priority: &str) -> Update {
    let location = locate(text, task_id);
    debug!(task_id, priority, ?location, "applying priority");

    splice(text, location, |index, line| {
        if Some(index) == location.table {
            rewrite_table_priority(line, task_id, priority)
        } else if Some(index) == location.priority_detail {
            rewrite_field(line, "Priority", priority)
        } else {
            None
        }
    })
}

/// Replace located lines with `rewrite(index, line)`, keeping every other
/// line verbatim. `None` leaves the line as it is.
fn splice(
    text: &str,
    location: TaskLocation,
    rewrite: impl Fn(usize, &str) -> Option<String>,
) -> Update {
    let targets = location.lines();
    if targets.is_empty() {
        return Update {
            text: text.to_string(),
            changed: false,
            location,
        };
    }

    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    for index in targets {
        let Some(line) = lines.get(index) else {
            continue;
        };
        let (body, cr) = match line.strip_suffix('\r') {
            Some(body) => (body, "\r"),
            None => (line.as_str(), ""),
        };
        if let Some(new_body) = rewrite(index, body) {
            lines[index] = format!("{new_body}{cr}");
        }
    }

    let new_text = lines.join("\n");
    let changed = new_text != text;
    Update {
        text: new_text,
        changed,
        location,
    }
}

/// `### ID: Title (glyph LABEL)`, with `~~ID~~` when done.
fn rewrite_header(line: &str, status: &Status) -> Option<String> {
    let header = parse_task_header(line)?;
    let title = strip_status_suffix(header.rest.trim(), status);
    let id = if status.is_done() {
        format!("~~{}~~", header.id)
    } else {
        header.id.to_string()
    };

    if title.is_empty() {
        Some(format!("### {id}: ({})", status.display()))
    } else {
        Some(format!("### {id}: {title} ({})", status.display()))
    }
}

/// Remove any trailing status rendering from a header title.
///
/// Handles the exact `(glyph LABEL)` suffix for `status`, any other
/// `(glyph LABEL)` or `(LABEL)` suffix, `✅ DONE` and a bare trailing glyph,
/// repeatedly, so stacked suffixes collapse.
fn strip_status_suffix<'a>(title: &'a str, status: &Status) -> &'a str {
    let current = format!("({})", status.display());
    let mut title = title.trim_end();
    loop {
        if let Some(stripped) = title.strip_suffix(current.as_str()) {
            title = stripped.trim_end();
            continue;
        }
        if let Some(stripped) = strip_status_parenthetical(title) {
            title = stripped.trim_end();
            continue;
        }
        if let Some(stripped) = strip_glyph_label(title) {
            title = stripped.trim_end();
            continue;
        }
        if let Some(stripped) = status::strip_trailing_glyph(title) {
            title = stripped.trim_end();
            continue;
        }
        return title;
    }
}

/// Strip a trailing parenthetical that reads as a status rendering.
///
/// Candidate openings are tried from the right, so a label that itself holds
/// `(` (`(📋 X (Y)`) is still found whole.
fn strip_status_parenthetical(title: &str) -> Option<&str> {
    let inner_end = title.strip_suffix(')')?;
    inner_end
        .match_indices('(')
        .rev()
        .find(|&(open, _)| is_status_rendering(inner_end[open + 1..].trim()))
        .map(|(open, _)| &title[..open])
}

/// `glyph LABEL` as rendered by [`Status::display`], or a bare known label.
fn is_status_rendering(inner: &str) -> bool {
    match status::strip_glyph(inner) {
        Some(label) => status::is_known_label(label) || label.to_uppercase() == label,
        None => status::is_known_label(inner),
    }
}

fn strip_glyph_label(title: &str) -> Option<&str> {
    KNOWN_LABELS.iter().find_map(|label| {
        let split = title.len().checked_sub(label.len())?;
        if !title.is_char_boundary(split) || !title[split..].eq_ignore_ascii_case(label) {
            return None;
        }
        status::strip_trailing_glyph(title[..split].trim_end())
    })
}

/// Replace the value after `**Label**:` / `Label:`.
fn rewrite_field(line: &str, label: &str, value: &str) -> Option<String> {
    let start = scanner::field_value_start(line, label)?;
    Some(format!("{} {value}", &line[..start]))
}

/// Split a table row into its `|`-separated segments.
///
/// Returns the segments and the range of interior cell indices (the leading
/// segment before the first `|` and a trailing segment after a closing `|`
/// are not cells).
fn table_cells(line: &str) -> (Vec<String>, std::ops::Range<usize>) {
    let cells: Vec<String> = line.split('|').map(str::to_string).collect();
    let end = if line.trim_end().ends_with('|') {
        cells.len().saturating_sub(1)
    } else {
        cells.len()
    };
    (cells, 1..end.max(1))
}

fn rewrite_table_status(line: &str, task_id: &str, status: &Status) -> Option<String> {
    let (mut cells, interior) = table_cells(line);
    let id_index = interior
        .clone()
        .find(|&index| scanner::contains_task_id(&cells[index], task_id))?;

    let marked = if status.is_done() {
        format!("~~**{task_id}**~~")
    } else {
        format!("**{task_id}**")
    };
    cells[id_index] = replace_id_markup(&cells[id_index], task_id, &marked)?;

    let status_index = (id_index + 1..interior.end)
        .find(|&index| is_status_cell(&cells[index]))
        .or_else(|| (id_index + 1 < interior.end).then_some(id_index + 1));
    if let Some(index) = status_index {
        cells[index] = format!(" {} **{}** ", status.glyph(), status.label());
    }

    Some(cells.join("|"))
}

/// Replace the identifier and any `~`/`*` markup hugging it.
fn replace_id_markup(cell: &str, task_id: &str, marked: &str) -> Option<String> {
    let token = scanner::find_task_id(cell, task_id)?;
    let is_markup = |ch: char| ch == '~' || ch == '*';
    let start = cell[..token.start].trim_end_matches(is_markup).len();
    let end = cell.len() - cell[token.end..].trim_start_matches(is_markup).len();
    Some(format!("{}{marked}{}", &cell[..start], &cell[end..]))
}

fn is_status_cell(cell: &str) -> bool {
    let text = cell.trim().trim_matches(|ch| ch == '*' || ch == '~').trim();
    status::strip_glyph(text).is_some() || status::is_known_label(text)
}

fn rewrite_table_priority(line: &str, task_id: &str, priority: &str) -> Option<String> {
    let (mut cells, interior) = table_cells(line);
    let id_index = interior
        .clone()
        .find(|&index| scanner::contains_task_id(&cells[index], task_id))?;
    let index = (id_index + 1..interior.end).find(|&index| {
        let cell = &cells[index];
        is_priority_cell(cell) || cell.trim() == priority
    })?;
    cells[index] = format!(" {priority} ");
    Some(cells.join("|"))
}

/// Cell holds a priority-like word: `P1`-`P3`, `HIGH`, `MEDIUM`, `LOW` or `Priority`.
fn is_priority_cell(cell: &str) -> bool {
    cell.split(|ch: char| !ch.is_ascii_alphanumeric())
        .any(|word| {
            let word = word.to_ascii_uppercase();
            matches!(word.as_str(), "P1" | "P2" | "P3" | "HIGH" | "MEDIUM" | "LOW" | "PRIORITY")
        })
}

/// Line of the document at `index`, without `\r`.
pub fn line_at(text: &str, index: usize) -> Option<&str> {
    text.split('\n').nth(index).map(strip_cr)
}
