//! Integration tests for the interactive session.
//!
//! Drive a session with scripted input and inspect both the printed
//! output and the controller state it leaves behind.

mod common;

use std::sync::Arc;

use common::{MemoryBackend, ids, user};
use roster::client::{Operation, TombstoneOverlay};
use roster::output::OutputFormat;
use roster::session::Session;
use roster::view::{ReconcileStrategy, UserListController};

fn seeded() -> Arc<MemoryBackend> {
    MemoryBackend::with_users(vec![
        user(1, "Ann", "a@x.com", None),
        user(2, "Bob", "b@x.com", Some("DevOps")),
        user(3, "Cid", "c@x.com", Some("Sales")),
    ])
}

async fn run_script<R: roster::client::UserResource>(session: &mut Session<R>, script: &str) -> String {
    colored::control::set_override(false);
    let mut out = Vec::new();
    session.run(script.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn mounts_and_renders_on_start() {
    let controller = UserListController::new(seeded(), ReconcileStrategy::Merge);
    let mut session = Session::new(controller, OutputFormat::Table);

    let output = run_script(&mut session, "quit\n").await;

    assert!(output.contains("Ann"), "got: {output}");
    assert!(output.contains("3 users"), "got: {output}");
    assert!(output.contains("roster> "));
}

#[tokio::test]
async fn search_then_clear() {
    let controller = UserListController::new(seeded(), ReconcileStrategy::Merge);
    let mut session = Session::new(controller, OutputFormat::Json);

    let output = run_script(&mut session, "search dev\n").await;
    assert!(output.contains("search: \"dev\""), "got: {output}");
    assert_eq!(session.query(), "dev");
    assert!(output.contains("\"total\": 1"), "got: {output}");

    let output = run_script(&mut session, "search\n").await;
    assert_eq!(session.query(), "");
    assert!(output.contains("\"total\": 3"), "got: {output}");
}

#[tokio::test]
async fn add_edit_and_remove() {
    let backend = seeded();
    let controller = UserListController::new(backend.clone(), ReconcileStrategy::Merge);
    let mut session = Session::new(controller, OutputFormat::Table);

    let output = run_script(
        &mut session,
        "add Dee Long;dee@x.com;Ops\nedit 2 department=Platform Team\nrm 1\nquit\n",
    )
    .await;

    assert!(output.contains("✔ User created successfully"), "got: {output}");
    assert!(output.contains("✔ User updated successfully"), "got: {output}");
    assert!(output.contains("✔ User deleted successfully"), "got: {output}");

    let snapshot = session.controller().snapshot();
    assert_eq!(ids(&snapshot), vec![2, 3, 4]);
    assert_eq!(snapshot[0].department.as_deref(), Some("Platform Team"));
    assert_eq!(snapshot[2].name, "Dee Long");
}

#[tokio::test]
async fn blank_department_edit_clears_it() {
    let backend = seeded();
    let controller = UserListController::new(backend.clone(), ReconcileStrategy::Merge);
    let mut session = Session::new(controller, OutputFormat::Table);

    let output = run_script(&mut session, "edit 2 department=\nquit\n").await;

    assert!(output.contains("✔ User updated successfully"), "got: {output}");
    let bob = session
        .controller()
        .snapshot()
        .into_iter()
        .find(|u| u.id == 2)
        .unwrap();
    assert_eq!(bob.department, None);
    assert_eq!(backend.stored()[1].department, None);
}

#[tokio::test]
async fn invalid_input_never_reaches_backend() {
    let backend = seeded();
    let controller = UserListController::new(backend.clone(), ReconcileStrategy::Merge);
    let mut session = Session::new(controller, OutputFormat::Table);

    let output = run_script(&mut session, "add Eve;not-an-email\nedit 2 name=\nbogus\n").await;

    assert!(output.contains("invalid email address"), "got: {output}");
    assert!(output.contains("name is required"), "got: {output}");
    assert!(output.contains("unknown command"), "got: {output}");
    assert_eq!(backend.calls(Operation::Create), 0);
    assert_eq!(backend.calls(Operation::Update), 0);
}

#[tokio::test]
async fn failures_are_reported_and_session_continues() {
    let backend = seeded();
    backend.fail(Operation::Delete);
    let controller = UserListController::new(backend.clone(), ReconcileStrategy::Merge);
    let mut session = Session::new(controller, OutputFormat::Table);

    let output = run_script(&mut session, "rm 1\nlist\n").await;

    assert!(output.contains("✖ Failed to delete user"), "got: {output}");
    assert_eq!(ids(&session.controller().snapshot()), vec![1, 2, 3]);
}

#[tokio::test]
async fn tombstones_last_for_the_session() {
    let backend = MemoryBackend::forgetful(vec![
        user(1, "Ann", "a@x.com", None),
        user(2, "Bob", "b@x.com", None),
    ]);
    let controller = UserListController::new(
        TombstoneOverlay::new(backend.clone()),
        ReconcileStrategy::Merge,
    );
    let mut session = Session::new(controller, OutputFormat::Table);

    run_script(&mut session, "rm 1\nrefresh\n").await;
    assert_eq!(ids(&session.controller().snapshot()), vec![2]);

    // A new session over the same backend starts without tombstones.
    let fresh = UserListController::new(
        TombstoneOverlay::new(backend.clone()),
        ReconcileStrategy::Merge,
    );
    let mut fresh = Session::new(fresh, OutputFormat::Table);
    run_script(&mut fresh, "quit\n").await;
    assert_eq!(ids(&fresh.controller().snapshot()), vec![1, 2]);
}

#[tokio::test]
async fn help_lists_commands() {
    let controller = UserListController::new(seeded(), ReconcileStrategy::Merge);
    let mut session = Session::new(controller, OutputFormat::Table);

    let output = run_script(&mut session, "help\n").await;
    assert!(output.contains("add NAME;EMAIL[;DEPARTMENT]"), "got: {output}");
    assert!(output.contains("refresh"));
}
