//! Command-line interface for planboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod init;
mod serve;
mod task;
mod watch;

/// planboard - live task board over a markdown master plan
///
/// Reads and rewrites task status and priority in a single plan document,
/// keeping every other line untouched, and notifies viewers when it changes.
#[derive(Parser, Debug)]
#[command(name = "planboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project root holding the plan document (defaults to current directory)
    #[arg(long, global = true, env = "PLANBOARD_ROOT")]
    pub root: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the plan document and config if missing
    Init,

    /// Print the plan document
    Show,

    /// Show every line that represents a task
    Locate {
        /// Task identifier (e.g. TASK-001)
        id: String,
    },

    /// Set a task property (status or priority)
    Set {
        /// Task identifier
        id: String,

        /// Property name: status or priority
        property: String,

        /// New value
        value: Option<String>,
    },

    /// Set a task status (aliases such as todo, in-progress, done accepted)
    Status {
        /// Task identifier
        id: String,

        /// Status token
        status: Option<String>,
    },

    /// Move a task to a board column (todo, in-progress, review, done)
    Move {
        /// Task identifier
        id: String,

        /// Column the task is leaving
        #[arg(long)]
        from: Option<String>,

        /// Column the task is entering
        #[arg(long)]
        to: String,
    },

    /// Print change events for the plan document as JSON lines
    Watch {
        /// Write events to a file instead of stdout ("-" for stdout)
        #[arg(long)]
        events: Option<String>,
    },

    /// Serve the board over HTTP with live change events
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(long, env = "PLANBOARD_PORT")]
        port: Option<u16>,

        /// Directory served for non-API paths
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(init::InitOptions {
                root: self.root,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Show => task::run_show(task::ShowOptions {
                root: self.root,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Locate { id } => task::run_locate(task::LocateOptions {
                id,
                root: self.root,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Set { id, property, value } => task::run_set(task::SetOptions {
                id,
                property,
                value,
                root: self.root,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Status { id, status } => task::run_status(task::StatusOptions {
                id,
                status,
                root: self.root,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Move { id, from, to } => task::run_move(task::MoveOptions {
                id,
                from,
                to,
                root: self.root,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Watch { events } => watch::run(watch::WatchOptions {
                events,
                root: self.root,
            }),
            Commands::Serve {
                host,
                port,
                static_dir,
            } => serve::run(serve::ServeOptions {
                host,
                port,
                static_dir,
                root: self.root,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }

    /// `watch` writing events to stdout keeps errors off the event stream.
    pub fn events_to_stdout(&self) -> bool {
        match &self.command {
            Commands::Watch { events } => {
                crate::events::EventDestination::parse(events.as_deref())
                    == crate::events::EventDestination::Stdout
            }
            _ => false,
        }
    }

    /// Commands that run until interrupted log at `info` by default.
    pub fn is_long_running(&self) -> bool {
        matches!(self.command, Commands::Watch { .. } | Commands::Serve { .. })
    }
}

/// Project root from `--root`, or the current directory.
pub(crate) fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}
