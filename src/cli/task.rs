//! Task commands: show, locate, set, status, move.

use std::path::PathBuf;

use serde::Serialize;

use crate::board::Board;
use crate::config::Config;
use crate::error::Result;
use crate::locate::TaskLocation;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::update::line_at;

use super::resolve_root;

pub struct ShowOptions {
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct LocateOptions {
    pub id: String,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SetOptions {
    pub id: String,
    pub property: String,
    pub value: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct StatusOptions {
    pub id: String,
    pub status: Option<String>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct MoveOptions {
    pub id: String,
    pub from: Option<String>,
    pub to: String,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

fn open_board(root: Option<PathBuf>) -> Result<Board> {
    let root = resolve_root(root)?;
    let config = Config::load_from_root(&root);
    Ok(Board::open(&root, &config))
}

#[derive(Serialize)]
struct ShowReport {
    path: PathBuf,
    content: String,
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let board = open_board(options.root)?;
    let content = board.get_document()?;

    if options.json {
        let report = ShowReport {
            path: board.store().path().to_path_buf(),
            content,
        };
        return emit_success(
            OutputOptions {
                json: true,
                quiet: options.quiet,
            },
            "show",
            &report,
            None,
        );
    }

    print!("{content}");
    Ok(())
}

#[derive(Serialize)]
struct LocatedLine {
    kind: &'static str,
    /// 1-based line number.
    line: usize,
    text: String,
}

#[derive(Serialize)]
struct LocateReport {
    id: String,
    found: bool,
    lines: Vec<LocatedLine>,
}

pub fn run_locate(options: LocateOptions) -> Result<()> {
    let board = open_board(options.root)?;
    let text = board.get_document()?;
    let location = board.locate(&options.id)?;
    let lines = located_lines(&text, &location);

    let header = if lines.is_empty() {
        format!("{}: not found", options.id)
    } else {
        format!("{}: {} representation(s)", options.id, lines.len())
    };
    let mut human = HumanOutput::new(header);
    for line in &lines {
        human.push_detail(format!("{} (line {}): {}", line.kind, line.line, line.text));
    }

    let report = LocateReport {
        id: options.id,
        found: !lines.is_empty(),
        lines,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "locate",
        &report,
        Some(&human),
    )
}

fn located_lines(text: &str, location: &TaskLocation) -> Vec<LocatedLine> {
    let kinds = [
        ("header", location.header),
        ("table", location.table),
        ("status", location.status_detail),
        ("priority", location.priority_detail),
    ];
    let mut lines: Vec<LocatedLine> = kinds
        .into_iter()
        .filter_map(|(kind, index)| {
            let index = index?;
            Some(LocatedLine {
                kind,
                line: index + 1,
                text: line_at(text, index).unwrap_or_default().to_string(),
            })
        })
        .collect();
    lines.sort_by_key(|line| line.line);
    lines
}

fn change_header(id: &str, changed: bool) -> String {
    if changed {
        format!("Updated {id}")
    } else {
        format!("No change needed for {id}")
    }
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let board = open_board(options.root)?;
    let change = board.set_property(&options.id, &options.property, options.value.as_deref())?;

    let mut human = HumanOutput::new(change_header(&change.id, change.changed));
    human.push_summary(change.property.to_string(), change.value.clone());
    if !change.changed {
        human.push_next_step(format!("planboard locate {}", change.id));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "set",
        &change,
        Some(&human),
    )
}

pub fn run_status(options: StatusOptions) -> Result<()> {
    let board = open_board(options.root)?;
    let change = board.set_status(&options.id, options.status.as_deref())?;

    let mut human = HumanOutput::new(change_header(&change.id, change.changed));
    human.push_summary("status", change.status.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "status",
        &change,
        Some(&human),
    )
}

pub fn run_move(options: MoveOptions) -> Result<()> {
    let board = open_board(options.root)?;
    let change = board.move_task(&options.id, options.from.as_deref(), Some(&options.to))?;

    let mut human = HumanOutput::new(change_header(&change.id, change.changed));
    if let Some(from) = &change.from_column {
        human.push_summary("from", from.clone());
    }
    human.push_summary("to", change.to_column.clone());
    human.push_summary("status", change.status.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "move",
        &change,
        Some(&human),
    )
}
