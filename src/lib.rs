//! planboard - live task board over a markdown master plan
//!
//! This library provides the core functionality for the planboard CLI and
//! server: rewriting task properties inside one plan document without
//! disturbing anything else, and telling viewers when the document changes.
//!
//! # Core Concepts
//!
//! - **Task**: a `LETTERS-DIGITS` identifier with a status and a priority
//! - **Representation**: a line that encodes part of a task (header, table
//!   row, `Status:` or `Priority:` detail line)
//! - **Status vocabulary**: aliases resolving to canonical labels and glyphs
//! - **Change notification**: debounced file watching fanned out to listeners
//!
//! # Module Organization
//!
//! - `status`: Status vocabulary and board-column mapping
//! - `scanner`: Line classification with task/section context
//! - `locate`: Finding every representation of a task
//! - `update`: Rewriting the lines that encode a property
//! - `board`: Document-level operations (get, set property, set status, move)
//! - `document`: Plan document storage and bootstrap
//! - `lock`: File locking and atomic writes for concurrency safety
//! - `watch`: Debounced change detection and the listener registry
//! - `events`: Change event wire format and JSONL sink
//! - `server`: HTTP API and server-sent events
//! - `config`: Configuration loading from `.planboard.toml`
//! - `output`: CLI output envelopes
//! - `cli`: Command-line interface using clap
//! - `error`: Error types and result aliases

pub mod board;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod locate;
pub mod lock;
pub mod output;
pub mod scanner;
pub mod server;
pub mod status;
pub mod update;
pub mod watch;

pub use error::{Error, Result};
