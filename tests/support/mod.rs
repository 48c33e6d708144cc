#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use planboard::board::Board;
use planboard::document::DocumentStore;
use tempfile::TempDir;

pub const PLAN_PATH: &str = "docs/MASTER_PLAN.md";

pub const SAMPLE_PLAN: &str = "# MASTER_PLAN

## Active Work

### TASK-001: Fix bug (📋 PLANNED)

**Priority**: P2-MEDIUM
**Status**: 📋 PLANNED

Notes mentioning TASK-001 stay put.

### TASK-010: Ship sync (🔄 IN PROGRESS)

**Priority**: P1-HIGH

---

## Roadmap

| ID | Feature | Priority | Status |
|----|---------|----------|--------|
| TASK-002 | Sync | P2 | PLANNED |
| ROAD-001 | Example feature | P2 | TODO |
";

pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn with_plan(contents: &str) -> Self {
        let project = Self::new();
        project
            .write_file(PLAN_PATH, contents)
            .expect("failed to write plan");
        project
    }

    pub fn sample() -> Self {
        Self::with_plan(SAMPLE_PLAN)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn plan_path(&self) -> PathBuf {
        self.dir.path().join(PLAN_PATH)
    }

    pub fn read_plan(&self) -> String {
        fs::read_to_string(self.plan_path()).expect("failed to read plan")
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(".planboard.toml", contents)
    }

    pub fn board(&self) -> Board {
        Board::new(DocumentStore::new(self.plan_path()))
    }
}

pub fn planboard_cmd(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("planboard").expect("binary");
    cmd.current_dir(project.path())
        .env_remove("PLANBOARD_ROOT")
        .env_remove("PLANBOARD_PORT")
        .env_remove("RUST_LOG");
    cmd
}
