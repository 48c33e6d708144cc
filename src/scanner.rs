//! Line scanner for master plan documents.
//!
//! A single forward pass over the document's lines. Each line gets a
//! [`LineKind`] plus the task it belongs to, if any. The scanner carries one
//! piece of state between lines: the task whose header was seen most recently
//! in the current section. Headings of level 1-2 and horizontal rules close
//! the section and clear that state.
//!
//! ```text
//! ## Active Work                    SectionBoundary
//! ### TASK-001: Fix bug (📋 PLANNED) TaskHeader      TASK-001
//! **Status**: 📋 PLANNED            StatusDetail    TASK-001
//! **Priority**: P2                  PriorityDetail  TASK-001
//! ---                               SectionBoundary
//! **Status**: orphan                Other
//! | TASK-002 | PLANNED |            TableRow        TASK-002
//! ```
//!
//! Lines that match none of the rules are [`LineKind::Other`] and are never
//! rewritten.

/// Classification of a single document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `### ID: title (status)` heading; opens a task context.
    TaskHeader,
    /// Level 1-2 heading or horizontal rule; closes the task context.
    SectionBoundary,
    /// Table row whose first identifier names the task.
    TableRow,
    /// `**Status**:` field inside a task context.
    StatusDetail,
    /// `**Priority**:` field inside a task context.
    PriorityDetail,
    /// Anything else.
    Other,
}

/// One classified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedLine<'a> {
    /// Zero-based line index.
    pub index: usize,
    /// Line text without its `\n` (a trailing `\r` is kept).
    pub text: &'a str,
    pub kind: LineKind,
    /// Task the line represents. Always `None` for `Other` and `SectionBoundary`.
    pub task: Option<&'a str>,
}

/// Parsed `### ID: rest` heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHeader<'a> {
    pub id: &'a str,
    /// Identifier was wrapped in `~~`.
    pub struck: bool,
    /// Everything after the colon, untrimmed.
    pub rest: &'a str,
}

/// Iterator over classified lines; see [`scan`].
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    lines: std::iter::Enumerate<std::str::Split<'a, char>>,
    current_task: Option<&'a str>,
}

/// Scan `text` line by line.
///
/// Lines are split on `\n` only, so joining the `text` of every scanned line
/// with `\n` reproduces the input byte for byte.
pub fn scan(text: &str) -> Scanner<'_> {
    Scanner {
        lines: text.split('\n').enumerate(),
        current_task: None,
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = ScannedLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, text) = self.lines.next()?;
        let (kind, task) = self.classify(strip_cr(text));
        Some(ScannedLine {
            index,
            text,
            kind,
            task,
        })
    }
}

impl<'a> Scanner<'a> {
    fn classify(&mut self, line: &'a str) -> (LineKind, Option<&'a str>) {
        if let Some(header) = parse_task_header(line) {
            self.current_task = Some(header.id);
            return (LineKind::TaskHeader, Some(header.id));
        }

        if is_section_boundary(line) {
            self.current_task = None;
            return (LineKind::SectionBoundary, None);
        }

        if is_table_row(line) {
            return match task_ids(line).next() {
                Some(token) => (LineKind::TableRow, Some(token.id)),
                None => (LineKind::Other, None),
            };
        }

        if let Some(task) = self.current_task {
            if field_value_start(line, "Status").is_some() {
                return (LineKind::StatusDetail, Some(task));
            }
            if field_value_start(line, "Priority").is_some() {
                return (LineKind::PriorityDetail, Some(task));
            }
        }

        (LineKind::Other, None)
    }
}

/// Drop a trailing `\r` left over from CRLF line endings.
pub fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parse a level-3 task heading: `### ID: ...` or `### ~~ID~~: ...`.
pub fn parse_task_header(line: &str) -> Option<TaskHeader<'_>> {
    let body = line.strip_prefix("### ")?.trim_start();
    let (struck, body) = match body.strip_prefix("~~") {
        Some(inner) => (true, inner),
        None => (false, body),
    };

    let id_len = id_len_at(body.as_bytes(), 0)?;
    let (id, after) = body.split_at(id_len);

    let after = if struck {
        after.strip_prefix("~~")?
    } else {
        after.strip_prefix("~~").unwrap_or(after)
    };
    let rest = after.strip_prefix(':')?;

    Some(TaskHeader { id, struck, rest })
}

/// Level 1-2 heading, or a bare horizontal rule (`---`, `***`, `___`).
pub fn is_section_boundary(line: &str) -> bool {
    if line.starts_with("# ") || line.starts_with("## ") || line == "#" || line == "##" {
        return true;
    }
    let trimmed = line.trim();
    trimmed.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|rule| trimmed.chars().all(|ch| ch == *rule))
}

pub fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Byte offset just past `**Label**:` or `Label:` at the start of `line`.
pub fn field_value_start(line: &str, label: &str) -> Option<usize> {
    let bold = format!("**{label}**:");
    if line.starts_with(&bold) {
        return Some(bold.len());
    }
    let plain = format!("{label}:");
    if line.starts_with(&plain) {
        return Some(plain.len());
    }
    None
}

/// A task identifier occurrence inside a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdToken<'a> {
    pub id: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Iterate every `LETTERS-DIGITS` token in `text`.
///
/// A token must not be preceded by an ASCII letter or digit, and its digit run
/// is always taken in full, so `TASK-1` never matches inside `TASK-10`.
pub fn task_ids(text: &str) -> impl Iterator<Item = IdToken<'_>> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos < bytes.len() {
            let start = pos;
            let at_boundary = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
            if at_boundary {
                if let Some(len) = id_len_at(bytes, start) {
                    pos = start + len;
                    return Some(IdToken {
                        id: &text[start..start + len],
                        start,
                        end: start + len,
                    });
                }
            }
            pos += 1;
        }
        None
    })
}

/// First exact occurrence of `task_id` in `text`.
pub fn find_task_id<'a>(text: &'a str, task_id: &str) -> Option<IdToken<'a>> {
    task_ids(text).find(|token| token.id == task_id)
}

pub fn contains_task_id(text: &str, task_id: &str) -> bool {
    find_task_id(text, task_id).is_some()
}

/// True if `value` is a well-formed task identifier.
pub fn is_task_id(value: &str) -> bool {
    id_len_at(value.as_bytes(), 0) == Some(value.len())
}

/// Length of the `[A-Z]+-[0-9]+` run starting at `start`, if any.
fn id_len_at(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    while pos < bytes.len() && bytes[pos].is_ascii_uppercase() {
        pos += 1;
    }
    if pos == start || bytes.get(pos) != Some(&b'-') {
        return None;
    }
    pos += 1;
    let digits_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos == digits_start {
        return None;
    }
    Some(pos - start)
}
