mod support;

use std::fs;

use predicates::prelude::*;
use predicates::str::contains;

use support::{planboard_cmd, TestProject, SAMPLE_PLAN};

#[test]
fn init_bootstraps_document_and_config() -> Result<(), Box<dyn std::error::Error>> {
    let project = TestProject::new();

    planboard_cmd(&project)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("planboard init: initialized project"));

    let plan = project.read_plan();
    assert!(plan.contains("### TASK-001: Getting Started (PLANNED)"));
    assert!(project.path().join(".planboard.toml").exists());

    planboard_cmd(&project)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("nothing to do"));
    Ok(())
}

#[test]
fn init_copies_template_when_present() -> Result<(), Box<dyn std::error::Error>> {
    let project = TestProject::new();
    project.write_file(
        "templates/MASTER_PLAN.template.md",
        "# Team plan\n\n### TEAM-1: Kickoff (PLANNED)\n",
    )?;

    planboard_cmd(&project)
        .args(["--json", "init"])
        .assert()
        .success()
        .stdout(contains("\"bootstrap\": \"from_template\""));

    assert_eq!(
        project.read_plan(),
        "# Team plan\n\n### TEAM-1: Kickoff (PLANNED)\n"
    );
    Ok(())
}

#[test]
fn show_prints_document_verbatim() {
    let project = TestProject::sample();
    planboard_cmd(&project)
        .arg("show")
        .assert()
        .success()
        .stdout(SAMPLE_PLAN);
}

#[test]
fn status_command_rewrites_every_representation() {
    let project = TestProject::sample();

    planboard_cmd(&project)
        .args(["status", "TASK-001", "done"])
        .assert()
        .success()
        .stdout(contains("Updated TASK-001"))
        .stdout(contains("status: DONE"));

    let plan = project.read_plan();
    assert!(plan.contains("### ~~TASK-001~~: Fix bug (✅ DONE)\n"));
    assert!(plan.contains("**Status**: ✅ DONE\n"));
    assert!(plan.contains("Notes mentioning TASK-001 stay put.\n"));
}

#[test]
fn repeated_status_reports_no_change() {
    let project = TestProject::sample();
    planboard_cmd(&project)
        .args(["status", "TASK-010", "in progress"])
        .assert()
        .success()
        .stdout(contains("No change needed for TASK-010"));
    assert_eq!(project.read_plan(), SAMPLE_PLAN);
}

#[test]
fn set_priority_and_json_envelope() -> Result<(), Box<dyn std::error::Error>> {
    let project = TestProject::sample();

    let output = planboard_cmd(&project)
        .args(["--json", "set", "TASK-002", "priority", "P1"])
        .output()?;
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(payload["schema_version"], "planboard.v1");
    assert_eq!(payload["command"], "set");
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["data"]["id"], "TASK-002");
    assert_eq!(payload["data"]["property"], "priority");
    assert_eq!(payload["data"]["value"], "P1");
    assert_eq!(payload["data"]["changed"], true);

    assert!(project
        .read_plan()
        .contains("| TASK-002 | Sync | P1 | PLANNED |\n"));
    Ok(())
}

#[test]
fn move_maps_column_to_status() {
    let project = TestProject::sample();
    planboard_cmd(&project)
        .args(["move", "ROAD-001", "--from", "todo", "--to", "review"])
        .assert()
        .success()
        .stdout(contains("status: IN REVIEW"));

    assert!(project
        .read_plan()
        .contains("| **ROAD-001** | Example feature | P2 | 👀 **IN REVIEW** |\n"));
}

#[test]
fn locate_lists_representations() -> Result<(), Box<dyn std::error::Error>> {
    let project = TestProject::sample();

    planboard_cmd(&project)
        .args(["locate", "TASK-001"])
        .assert()
        .success()
        .stdout(contains("TASK-001: 3 representation(s)"))
        .stdout(contains("header (line 5): ### TASK-001: Fix bug (📋 PLANNED)"))
        .stdout(contains("priority (line 7)"))
        .stdout(contains("status (line 8)"));

    let output = planboard_cmd(&project)
        .args(["--json", "locate", "TASK-999"])
        .output()?;
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(payload["data"]["found"], false);
    Ok(())
}

#[test]
fn unknown_task_is_not_an_error() {
    let project = TestProject::sample();
    planboard_cmd(&project)
        .args(["set", "TASK-999", "status", "done"])
        .assert()
        .success()
        .stdout(contains("No change needed for TASK-999"));
    assert_eq!(project.read_plan(), SAMPLE_PLAN);
}

#[test]
fn contract_violations_exit_with_user_error() {
    let project = TestProject::sample();

    planboard_cmd(&project)
        .args(["set", "TASK-001", "title", "New"])
        .assert()
        .code(2)
        .stderr(contains("Unknown property 'title'"));

    planboard_cmd(&project)
        .args(["set", "TASK-001", "priority"])
        .assert()
        .code(2)
        .stderr(contains("Missing value"));

    assert_eq!(project.read_plan(), SAMPLE_PLAN);
}

#[test]
fn multi_line_and_piped_values_are_refused() {
    let project = TestProject::sample();

    planboard_cmd(&project)
        .args(["set", "TASK-001", "priority", "P1\n### EVIL-1: injected"])
        .assert()
        .code(2)
        .stderr(contains("single line"));

    planboard_cmd(&project)
        .args(["status", "TASK-002", "a|b"])
        .assert()
        .code(2)
        .stderr(contains("cannot contain '|'"));

    assert_eq!(project.read_plan(), SAMPLE_PLAN);
}

#[test]
fn missing_document_is_an_operation_failure() {
    let project = TestProject::new();
    planboard_cmd(&project)
        .args(["status", "TASK-001", "done"])
        .assert()
        .code(4)
        .stderr(contains("Document not found"))
        .stderr(contains("hint: planboard init"));
}

#[test]
fn json_errors_use_envelope() -> Result<(), Box<dyn std::error::Error>> {
    let project = TestProject::new();
    let output = planboard_cmd(&project).args(["--json", "show"]).output()?;
    assert_eq!(output.status.code(), Some(4));

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["command"], "show");
    assert_eq!(payload["error"]["kind"], "operation_failed");
    assert_eq!(payload["error"]["code"], 4);
    Ok(())
}

#[test]
fn root_flag_and_config_select_document() -> Result<(), Box<dyn std::error::Error>> {
    let project = TestProject::new();
    project.write_config("document = \"plans/board.md\"\n")?;
    project.write_file("plans/board.md", "### OPS-7: Rotate keys (📋 PLANNED)\n")?;

    let elsewhere = TestProject::new();
    planboard_cmd(&elsewhere)
        .arg("--root")
        .arg(project.path())
        .args(["status", "OPS-7", "in-progress"])
        .assert()
        .success();

    let plan = fs::read_to_string(project.path().join("plans/board.md"))?;
    assert_eq!(plan, "### OPS-7: Rotate keys (🔄 IN PROGRESS)\n");
    Ok(())
}

#[test]
fn quiet_suppresses_human_output() {
    let project = TestProject::sample();
    planboard_cmd(&project)
        .args(["--quiet", "status", "TASK-002", "review"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
