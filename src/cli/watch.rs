//! planboard watch command implementation
//!
//! Streams change events for the plan document as JSON lines until
//! interrupted.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::EventDestination;
use crate::watch::{watch_document, ListenerRegistry};

use super::resolve_root;

pub struct WatchOptions {
    pub events: Option<String>,
    pub root: Option<PathBuf>,
}

pub fn run(options: WatchOptions) -> Result<()> {
    let root = resolve_root(options.root)?;
    let config = Config::load_from_root(&root);
    let document = config.document_path(&root);
    if !document.is_file() {
        return Err(Error::DocumentNotFound(document));
    }

    let mut sink = EventDestination::parse(options.events.as_deref()).open()?;
    let registry = ListenerRegistry::new();
    let mut subscription = registry.subscribe();
    let quiet = Duration::from_millis(config.watch.debounce_ms);
    let _watcher = watch_document(&document, quiet, registry.clone())?;

    while let Some(event) = subscription.blocking_recv() {
        sink.emit(&event)?;
    }
    info!("event stream closed");
    Ok(())
}
