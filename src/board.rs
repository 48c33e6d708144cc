//! Task board operations over the plan document.
//!
//! Every mutating operation validates its input first, then runs one
//! locked read-modify-write through [`DocumentStore::modify`]. A task with no
//! representation in the document is a successful no-op (`changed: false`).

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::document::DocumentStore;
use crate::error::{Error, Result};
use crate::locate::{locate, TaskLocation};
use crate::status::{column_status, Status};
use crate::update::{self, Property};

/// Outcome of [`Board::set_property`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyChange {
    pub id: String,
    pub property: Property,
    pub value: String,
    pub changed: bool,
}

/// Outcome of [`Board::set_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub id: String,
    /// Canonical label the status token resolved to.
    pub status: String,
    pub changed: bool,
}

/// Outcome of [`Board::move_task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveChange {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_column: Option<String>,
    pub to_column: String,
    pub status: String,
    pub changed: bool,
}

/// Engine entry point bound to one document.
#[derive(Debug, Clone)]
pub struct Board {
    store: DocumentStore,
}

impl Board {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Board for the configured document under `root`.
    pub fn open(root: &Path, config: &Config) -> Self {
        let store = DocumentStore::new(config.document_path(root))
            .with_lock_timeout(config.storage.lock_timeout_ms);
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Full document text.
    pub fn get_document(&self) -> Result<String> {
        self.store.read()
    }

    /// Lines representing `task_id` in the current document.
    pub fn locate(&self, task_id: &str) -> Result<TaskLocation> {
        let task_id = require_id(task_id)?;
        let text = self.store.read()?;
        Ok(locate(&text, task_id))
    }

    /// Set `property` of `task_id` to `value` in every representation.
    pub fn set_property(
        &self,
        task_id: &str,
        property: &str,
        value: Option<&str>,
    ) -> Result<PropertyChange> {
        let task_id = require_id(task_id)?;
        let property: Property = property.parse()?;
        let value = require_value(value, "value")?;

        let changed = self.apply(task_id, property, value)?;
        Ok(PropertyChange {
            id: task_id.to_string(),
            property,
            value: value.to_string(),
            changed,
        })
    }

    /// Set the status of `task_id` from any alias or canonical token.
    pub fn set_status(&self, task_id: &str, status: Option<&str>) -> Result<StatusChange> {
        let task_id = require_id(task_id)?;
        let token = require_value(status, "status")?;

        let changed = self.apply(task_id, Property::Status, token)?;
        Ok(StatusChange {
            id: task_id.to_string(),
            status: Status::resolve(token).label().to_string(),
            changed,
        })
    }

    /// Move `task_id` to a board column, setting the column's status.
    pub fn move_task(
        &self,
        task_id: &str,
        from_column: Option<&str>,
        to_column: Option<&str>,
    ) -> Result<MoveChange> {
        let task_id = require_id(task_id)?;
        let to_column = require_value(to_column, "toColumn")?;
        let token = column_status(to_column);
        debug!(task_id, from = ?from_column, to = to_column, token, "moving task");

        let change = self.set_status(task_id, Some(token))?;
        Ok(MoveChange {
            id: change.id,
            from_column: from_column.map(str::to_string),
            to_column: to_column.to_string(),
            status: change.status,
            changed: change.changed,
        })
    }

    fn apply(&self, task_id: &str, property: Property, value: &str) -> Result<bool> {
        let (changed, location) = self.store.modify(|text| {
            let update = update::apply(text, task_id, property, value);
            (update.text, update.location)
        })?;

        if location.is_empty() {
            info!(task_id, %property, "task not found in document; nothing to update");
        } else {
            info!(task_id, %property, value, changed, lines = ?location.lines(), "task updated");
        }
        Ok(changed)
    }
}

fn require_id(task_id: &str) -> Result<&str> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
    }
    Ok(task_id)
}

fn require_value<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str> {
    let value = value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(Error::MissingValue(name))?;
    update::check_value(value, name)
}
