//! Integration Tests
//!
//! Each test drives the `minsh` binary through its stdin the way an
//! interactive session would, one command per line.

extern crate assert_cli;
extern crate tempdir;

use std::fs;

use assert_cli::Assert;
use tempdir::TempDir;

fn minsh() -> Assert {
    // Invoke the already-built binary directly rather than via `cargo run`,
    // so tests that set `current_dir` to a temp dir still find the executable
    // and cargo's own build output never leaks into the asserted stderr.
    Assert::command(&[env!("CARGO_BIN_EXE_minsh")])
}

#[test]
fn test_simple_echo() {
    minsh()
        .stdin("echo test\nexit\n")
        .stdout()
        .contains("test")
        .unwrap();
}

#[test]
fn test_prompt_is_displayed() {
    minsh().stdin("exit\n").stdout().contains(": ").unwrap();
}

#[test]
fn test_status_before_any_command_reports_zero() {
    minsh()
        .stdin("status\nexit\n")
        .stdout()
        .contains("exit value: 0")
        .unwrap();
}

#[test]
fn test_status_reflects_last_foreground_command() {
    minsh()
        .stdin("false\nstatus\nexit\n")
        .stdout()
        .contains("exit value: 1")
        .unwrap();
}

#[test]
fn test_comments_and_blank_lines_are_ignored() {
    minsh()
        .stdin("# this is a comment, not a command\n\nstatus\nexit\n")
        .stdout()
        .contains("exit value: 0")
        .stderr()
        .is("")
        .unwrap();
}

#[test]
fn test_pid_marker_is_expanded() {
    minsh()
        .stdin("echo $$\nexit\n")
        .stdout()
        .doesnt_contain("$$")
        .unwrap();
}

#[test]
fn test_unknown_command_reports_and_sets_status() {
    minsh()
        .stdin("definitely-not-a-command-1234\nstatus\nexit\n")
        .stdout()
        .contains("exit value: 1")
        .stderr()
        .contains("command not found")
        .unwrap();
}

#[test]
fn test_output_redirection_creates_file() {
    let temp_dir = TempDir::new("minsh-tests").unwrap();
    minsh()
        .current_dir(temp_dir.path())
        .stdin("echo needle > haystack.txt\nexit\n")
        .unwrap();

    let written = fs::read_to_string(temp_dir.path().join("haystack.txt")).unwrap();
    assert_eq!(written, "needle\n");
}

#[test]
fn test_input_redirection_reads_file() {
    let temp_dir = TempDir::new("minsh-tests").unwrap();
    fs::write(temp_dir.path().join("in.txt"), "needle\n").unwrap();

    minsh()
        .current_dir(temp_dir.path())
        .stdin("cat < in.txt\nexit\n")
        .stdout()
        .contains("needle")
        .unwrap();
}

#[test]
fn test_missing_input_file_reports_error() {
    minsh()
        .stdin("cat < nope-not-here\nstatus\nexit\n")
        .stdout()
        .contains("exit value: 1")
        .stderr()
        .contains("cannot open input file")
        .unwrap();
}

#[test]
fn test_missing_redirection_target_is_a_parse_error() {
    minsh()
        .stdin("cat <\nstatus\nexit\n")
        .stdout()
        .contains("exit value: 0")
        .stderr()
        .contains("requires a file name")
        .unwrap();
}

#[test]
fn test_background_spawn_reports_pid() {
    minsh()
        .stdin("sleep 0 &\nexit\n")
        .stdout()
        .contains("Background pid is")
        .unwrap();
}

#[test]
fn test_one_shot_command_mode() {
    minsh()
        .with_args(&["-c", "echo direct"])
        .stdout()
        .contains("direct")
        .unwrap();
}

#[test]
fn test_version_flag() {
    minsh()
        .with_args(&["--version"])
        .stdout()
        .contains("minsh version")
        .unwrap();
}
