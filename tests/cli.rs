//! Binary tests for `add-tenant-id`.
//!
//! The tool takes no arguments, so each test runs it from a temp project
//! containing `server/routes.ts`.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod util;
use util::{ROUTES_FIXTURE, make_project, read_routes};

/// Helper to build the command inside `dir`
fn tool_cmd(dir: &std::path::Path) -> Command
{
    let mut cmd = Command::cargo_bin("add-tenant-id").expect("add-tenant-id binary");
    cmd.current_dir(dir);
    cmd
}

#[test]
fn rewrites_routes_in_place_and_reports_progress()
{
    let tmp = make_project(ROUTES_FIXTURE);

    tool_cmd(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing server/routes.ts..."))
        .stdout(predicate::str::contains("✓ Updated server/routes.ts"))
        .stdout(predicate::str::contains("Please review the changes and test the application."));

    let out = read_routes(&tmp);
    assert!(out.contains("      const users = await storage.getAllUsers(tenantId);"));
    assert!(out.contains("        await storage.deleteAnnouncement(req.params.id, tenantId);"));
    assert_eq!(out.lines().count(), ROUTES_FIXTURE.lines().count() + 3);
}

#[test]
fn second_run_leaves_file_unchanged()
{
    let tmp = make_project(ROUTES_FIXTURE);

    tool_cmd(tmp.path())
        .assert()
        .success();
    let once = read_routes(&tmp);

    tool_cmd(tmp.path())
        .assert()
        .success();
    assert_eq!(read_routes(&tmp), once);
}

#[test]
fn progress_messages_come_in_order()
{
    let tmp = make_project("const x = 1;\n");

    let assert = tool_cmd(tmp.path())
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Processing server/routes.ts...",
            "✓ Updated server/routes.ts",
            "Please review the changes and test the application.",
        ]
    );
    tmp.child("server/routes.ts")
        .assert("const x = 1;\n");
}

#[test]
fn missing_routes_file_fails()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    tool_cmd(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Processing server/routes.ts..."))
        .stdout(predicate::str::contains("Updated").not())
        .stderr(predicate::str::contains("server/routes.ts"));

    tmp.child("server/routes.ts")
        .assert(predicate::path::missing());
}

#[test]
fn ignores_command_line_arguments()
{
    let tmp = make_project(ROUTES_FIXTURE);

    tool_cmd(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Updated server/routes.ts"));
}
