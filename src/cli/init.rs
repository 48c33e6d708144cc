//! planboard init command implementation
//!
//! Creates the plan document (from the template or the built-in skeleton)
//! and a default `.planboard.toml` at the project root.

use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};
use crate::document::{ensure_document, Bootstrap};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::resolve_root;

pub struct InitOptions {
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    document: PathBuf,
    bootstrap: Bootstrap,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    document: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let root = resolve_root(options.root)?;
    let created_config = ensure_config(&root)?;
    let config = Config::load_from_root(&root);

    let document = config.document_path(&root);
    let bootstrap = ensure_document(&document, Some(config.template_path(&root).as_path()))?;
    let created_document = bootstrap != Bootstrap::Existing;

    let report = InitReport {
        root: root.clone(),
        document: document.clone(),
        bootstrap,
        created: InitCreated {
            config: created_config,
            document: created_document,
        },
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(CONFIG_FILE.to_string());
    }
    if created_document {
        created_items.push(config.document.clone());
    }

    let header = if created_items.is_empty() {
        "planboard init: nothing to do".to_string()
    } else {
        "planboard init: initialized project".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("root", root.display().to_string());
    human.push_summary("document", document.display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    match bootstrap {
        Bootstrap::FromTemplate => human.push_detail(format!("copied {}", config.template)),
        Bootstrap::Minimal => human.push_detail("wrote the built-in skeleton"),
        Bootstrap::Existing => {}
    }
    human.push_next_step("planboard serve");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &report,
        Some(&human),
    )?;

    Ok(())
}

fn ensure_config(root: &Path) -> Result<bool> {
    let path = root.join(CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(root)?;
    Config::default().save(&path)?;
    Ok(true)
}
