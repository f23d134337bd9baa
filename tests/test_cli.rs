//! End-to-end tests of the scrip binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn scrip() -> Command {
    Command::cargo_bin("scrip").unwrap()
}

#[test]
fn version_flag() {
    scrip()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("scrip "));
}

#[test]
fn help_flag_shows_grammar() {
    scrip()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GRAMMAR"))
        .stdout(predicate::str::contains("a ? b : c"));
}

#[test]
fn execute_one_line() {
    scrip()
        .args(["-c", "echo hi"])
        .assert()
        .success()
        .stdout("hi\n");
}

#[test]
fn status_becomes_the_exit_code() {
    scrip()
        .args(["-c", "status 3"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("(status 3)"));
}

#[test]
fn syntax_error_exits_two() {
    scrip()
        .args(["-c", "echo ["])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn missing_script_argument() {
    scrip()
        .arg("-c")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("-c requires"));
}

#[test]
fn run_script_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# greeting demo").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "set name world").unwrap();
    writeln!(file, "+echo hello [get name]").unwrap();
    file.flush().unwrap();

    scrip()
        .arg(file.path())
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn script_file_stops_at_syntax_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "echo before").unwrap();
    writeln!(file, "echo [").unwrap();
    writeln!(file, "echo after").unwrap();
    file.flush().unwrap();

    scrip()
        .arg(file.path())
        .assert()
        .code(2)
        .stdout("before\n")
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn missing_file_fails() {
    scrip()
        .arg("/no/such/file.scrip")
        .assert()
        .failure()
        .stderr(predicate::str::contains("/no/such/file.scrip"));
}

#[test]
fn definitions_persist_across_file_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "alias shout [+echo [arg 0]]").unwrap();
    writeln!(file, "shout loud").unwrap();
    file.flush().unwrap();

    scrip().arg(file.path()).assert().success().stdout("loud\n");
}
