mod support;

use planboard::locate::locate;
use planboard::status::{column_status, Status, DEFAULT_GLYPH};
use planboard::update::{apply, check_value, Property};
use proptest::prelude::*;

use support::SAMPLE_PLAN;

const TASK_IDS: [&str; 4] = ["TASK-1", "TASK-10", "ROAD-2", "OPS-7"];

/// Identifiers that never occur as a token in a generated document.
const ABSENT_IDS: [&str; 4] = ["TASK-100", "TASK-01", "ASK-1", "NEW-9"];

const LINE_SHAPES: [&str; 20] = [
    "### {id}: Fix bug (📋 PLANNED)",
    "### ~~{id}~~: Ship it (✅ DONE)",
    "### {id}: Support (v2) syntax",
    "### {id}: Start 🔄 IN PROGRESS",
    "### {id}: Review (IN REVIEW)",
    "**Status**: 📋 PLANNED",
    "Status: in progress",
    "**Priority**: P2-MEDIUM",
    "Priority: high",
    "| {id} | Sync | P2 | PLANNED |",
    "| **{id}** | 🔄 **IN PROGRESS** |",
    "| ~~**{id}**~~ | Feature | P3-LOW | ✅ **DONE** |",
    "| {id} |",
    "| ID | Feature | Priority | Status |",
    "|----|---------|----------|--------|",
    "## Roadmap",
    "---",
    "",
    "Notes mentioning {id} stay put.",
    "- [ ] follow up on {id} (P1)",
];

const STATUS_TOKENS: [&str; 8] = [
    "todo",
    "planned",
    "in-progress",
    "review",
    "monitoring",
    "done",
    "COMPLETED",
    "weird-status",
];

const PRIORITY_TOKENS: [&str; 4] = ["P1", "P2-MEDIUM", "P3-LOW", "HIGH"];

/// Free-form values, including markup characters and line breaks.
const FREE_VALUE: &str = r"[a-zA-Z0-9 ()~*|\r\n-]{1,12}";

fn task_id() -> impl Strategy<Value = &'static str> {
    prop::sample::select(TASK_IDS.to_vec())
}

fn document() -> impl Strategy<Value = String> {
    let line = (task_id(), prop::sample::select(LINE_SHAPES.to_vec()))
        .prop_map(|(id, shape)| shape.replace("{id}", id));
    (prop::collection::vec(line, 0..16), any::<bool>(), any::<bool>()).prop_map(
        |(lines, crlf, trailing_newline)| {
            let newline = if crlf { "\r\n" } else { "\n" };
            let mut text = lines.join(newline);
            if trailing_newline {
                text.push_str(newline);
            }
            text
        },
    )
}

fn update() -> impl Strategy<Value = (Property, String)> {
    let status = prop_oneof![
        prop::sample::select(STATUS_TOKENS.to_vec()).prop_map(str::to_string),
        FREE_VALUE,
    ]
    .prop_map(|value| (Property::Status, value));
    let priority = prop_oneof![
        prop::sample::select(PRIORITY_TOKENS.to_vec()).prop_map(str::to_string),
        FREE_VALUE,
    ]
    .prop_map(|value| (Property::Priority, value));
    prop_oneof![status, priority]
}

/// Values that would split a line or a table cell.
fn breaking_value() -> impl Strategy<Value = String> {
    (
        r"[a-zA-Z0-9 ()~*-]{0,6}",
        prop::sample::select(vec!["|", "\n", "\r", "\r\n"]),
        r"[a-zA-Z0-9 ()~*-]{0,6}",
    )
        .prop_map(|(head, breaker, tail)| format!("{head}{breaker}{tail}"))
}

proptest! {
    #[test]
    fn applying_twice_equals_applying_once(
        doc in document(),
        id in task_id(),
        (property, value) in update(),
    ) {
        let once = apply(&doc, id, property, &value);
        let twice = apply(&once.text, id, property, &value);
        prop_assert_eq!(&twice.text, &once.text, "{} {} {:?}", id, property, value);
        prop_assert!(!twice.changed);
    }

    #[test]
    fn only_located_lines_change(
        doc in document(),
        id in task_id(),
        (property, value) in update(),
    ) {
        let touched = locate(&doc, id).lines();
        let updated = apply(&doc, id, property, &value).text;

        let before: Vec<&str> = doc.split('\n').collect();
        let after: Vec<&str> = updated.split('\n').collect();
        prop_assert_eq!(before.len(), after.len());
        for (index, (old, new)) in before.iter().zip(&after).enumerate() {
            if !touched.contains(&index) {
                prop_assert_eq!(old, new, "line {}", index);
            }
        }
    }

    #[test]
    fn absent_task_leaves_document_identical(
        doc in document(),
        id in prop::sample::select(ABSENT_IDS.to_vec()),
        (property, value) in update(),
    ) {
        prop_assert!(locate(&doc, id).is_empty());
        let result = apply(&doc, id, property, &value);
        prop_assert_eq!(&result.text, &doc);
        prop_assert!(!result.changed);
    }

    #[test]
    fn rejected_values_are_never_written(
        doc in document(),
        id in task_id(),
        value in breaking_value(),
        is_status in any::<bool>(),
    ) {
        let property = if is_status { Property::Status } else { Property::Priority };
        prop_assert!(check_value(&value, "value").is_err());
        let result = apply(&doc, id, property, &value);
        prop_assert_eq!(&result.text, &doc);
        prop_assert!(!result.changed);
    }
}

#[test]
fn fixed_document_updates_are_idempotent_and_local() {
    for id in ["TASK-001", "TASK-010", "TASK-002", "ROAD-001"] {
        for value in STATUS_TOKENS {
            let once = apply(SAMPLE_PLAN, id, Property::Status, value).text;
            assert_eq!(apply(&once, id, Property::Status, value).text, once, "{id} {value}");
            assert_eq!(once.split('\n').count(), SAMPLE_PLAN.split('\n').count());
        }
    }
}

#[test]
fn absent_task_in_sample_plan() {
    for id in ["TASK-999", "TASK-01", "TASK-0010", "XTASK-001", "not-an-id"] {
        assert!(locate(SAMPLE_PLAN, id).is_empty(), "{id}");
        let update = apply(SAMPLE_PLAN, id, Property::Status, "done");
        assert_eq!(update.text, SAMPLE_PLAN);
        assert!(!update.changed);
    }
}

#[test]
fn aliases_converge() {
    assert_eq!(Status::resolve("todo"), Status::resolve("planned"));
    assert_eq!(Status::resolve("DONE"), Status::resolve("completed"));
    assert_eq!(Status::resolve("In-Progress"), Status::resolve("IN_PROGRESS"));
    assert_eq!(Status::resolve("review"), Status::resolve("In Review"));
}

#[test]
fn unknown_status_degrades_to_uppercase_label() {
    let status = Status::resolve("weird-status");
    assert_eq!(status.label(), "WEIRD-STATUS");
    assert_eq!(status.glyph(), DEFAULT_GLYPH);

    let updated = apply(SAMPLE_PLAN, "TASK-001", Property::Status, "weird-status").text;
    assert!(updated.contains("### TASK-001: Fix bug (📋 WEIRD-STATUS)\n"));
    assert!(updated.contains("**Status**: 📋 WEIRD-STATUS\n"));
}

#[test]
fn column_mapping_is_total() {
    let expected = [
        ("todo", "PLANNED"),
        ("in-progress", "IN PROGRESS"),
        ("review", "IN REVIEW"),
        ("done", "DONE"),
        ("backlog", "BACKLOG"),
    ];
    for (column, label) in expected {
        assert_eq!(Status::resolve(column_status(column)).label(), label, "{column}");
    }
    assert_eq!(column_status("backlog"), "backlog");
}

#[test]
fn done_header_scenario() {
    let text = "### TASK-001: Fix bug (📋 PLANNED)\n";
    let update = apply(text, "TASK-001", Property::Status, "done");
    assert!(update.changed);
    assert_eq!(update.text, "### ~~TASK-001~~: Fix bug (✅ DONE)\n");
}

#[test]
fn table_row_scenario() {
    let text = "| TASK-002 | PLANNED |\n";
    let update = apply(text, "TASK-002", Property::Status, "in-progress");
    assert_eq!(update.text, "| **TASK-002** | 🔄 **IN PROGRESS** |\n");
}

#[test]
fn done_round_trip_restores_plain_identifier() {
    let done = apply(SAMPLE_PLAN, "TASK-001", Property::Status, "done").text;
    let reopened = apply(&done, "TASK-001", Property::Status, "in-progress").text;
    assert!(reopened.contains("### TASK-001: Fix bug (🔄 IN PROGRESS)\n"));
    assert!(reopened.contains("**Status**: 🔄 IN PROGRESS\n"));

    let done_row = apply(SAMPLE_PLAN, "TASK-002", Property::Status, "done").text;
    assert!(done_row.contains("| ~~**TASK-002**~~ | Sync | P2 | ✅ **DONE** |\n"));
    let reopened_row = apply(&done_row, "TASK-002", Property::Status, "todo").text;
    assert!(reopened_row.contains("| **TASK-002** | Sync | P2 | 📋 **PLANNED** |\n"));
}

#[test]
fn prefix_identifiers_stay_isolated() {
    let updated = apply(SAMPLE_PLAN, "TASK-010", Property::Status, "done").text;
    assert!(updated.contains("### ~~TASK-010~~: Ship sync (✅ DONE)\n"));
    assert!(updated.contains("### TASK-001: Fix bug (📋 PLANNED)\n"));

    let text = "### TASK-1: One (📋 PLANNED)\n### TASK-10: Ten (📋 PLANNED)\n";
    let updated = apply(text, "TASK-1", Property::Status, "done").text;
    assert_eq!(
        updated,
        "### ~~TASK-1~~: One (✅ DONE)\n### TASK-10: Ten (📋 PLANNED)\n"
    );
}

#[test]
fn priority_detail_is_scoped_to_its_section() {
    let updated = apply(SAMPLE_PLAN, "TASK-010", Property::Priority, "P3-LOW").text;
    assert!(updated.contains("**Priority**: P2-MEDIUM\n"));
    assert!(updated.contains("**Priority**: P3-LOW\n"));
}
