//! Argument handling of the `graphrender` binary. None of these cases reach
//! the browser, so they run without Chrome installed.
#![cfg(feature = "cdp")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn graphrender(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_graphrender"))
        .args(args)
        .output()
        .expect("failed to run graphrender")
}

fn scratch(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("graphrender-cli-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_file(&path);
    path
}

fn assert_usage(out: &Output) {
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.trim(), "Usage: graphrender URL filename [zoom]");
}

#[test]
fn no_arguments_prints_usage() {
    assert_usage(&graphrender(&[]));
}

#[test]
fn url_only_prints_usage() {
    assert_usage(&graphrender(&["http://127.0.0.1:9/"]));
}

#[test]
fn too_many_arguments_print_usage_without_output() {
    let output = scratch("extra.png");
    let path = output.to_str().unwrap();

    assert_usage(&graphrender(&["http://127.0.0.1:9/", path, "1", "extra"]));
    assert_usage(&graphrender(&["http://127.0.0.1:9/", path, "1", "extra", "more", "args"]));
    assert!(!output.exists());
}

#[test]
fn invalid_zoom_prints_usage() {
    let output = scratch("zoom.png");
    let path = output.to_str().unwrap();

    assert_usage(&graphrender(&["http://127.0.0.1:9/", path, "wide"]));
    assert_usage(&graphrender(&["http://127.0.0.1:9/", path, "0"]));
    assert!(!output.exists());
}

#[test]
fn help_exits_successfully() {
    let out = graphrender(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("--delay-ms"));
}
