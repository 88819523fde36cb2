//! Integration tests for the `opal` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn opal() -> Command {
    Command::cargo_bin("opal").unwrap()
}

fn source_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn no_arguments_prints_usage() {
    opal()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage: opal"));
}

#[test]
fn help_exits_zero() {
    opal()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("Commands:"));
}

#[test]
fn unknown_command_exits_one() {
    opal()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown command 'frobnicate'"));
}

#[test]
fn missing_file_exits_one() {
    opal()
        .args(["run", "/no/such/file.opal"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn run_prints_program_output() {
    let file = source_file("void main() { print(42) print(true) }");
    opal()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("42true");
}

#[test]
fn run_array_defaults() {
    let file = source_file(
        "void main() { \
           array bool flags = new bool [3] \
           flags[0] = false \
           flags[1] = true \
           print(flags[0]) print(flags[1]) print(flags[2]) \
         }",
    );
    opal()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout("falsetruenull");
}

#[test]
fn run_reads_from_stdin_without_file() {
    opal()
        .arg("run")
        .write_stdin("void main() { print(\"piped\") }")
        .assert()
        .success()
        .stdout("piped");
}

#[test]
fn use_after_delete_exits_three() {
    let file = source_file(
        "struct P { int x } \
         void main() { P p = new P delete p print(p.x) }",
    );
    opal()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("struct does not exist"));
}

#[test]
fn deleted_array_exits_three() {
    let file = source_file(
        "void main() { array int xs = new int [2] delete xs print(xs[0]) }",
    );
    opal()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("array does not exist"));
}

#[test]
fn syntax_error_exits_two() {
    let file = source_file("void main() { int x = }");
    opal()
        .arg("parse")
        .arg(file.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("expecting value"));
}

#[test]
fn check_reports_static_error() {
    let file = source_file("void main() { print(missing) }");
    opal()
        .arg("check")
        .arg(file.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("use before definition of 'missing'"));
}

#[test]
fn check_is_silent_on_success() {
    let file = source_file("void main() { print(1) }");
    opal()
        .arg("check")
        .arg(file.path())
        .assert()
        .success()
        .stdout("");
}

#[test]
fn tokens_lists_positions() {
    let file = source_file("void main() {\n}\n");
    opal()
        .arg("tokens")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1, 1: VOID_TYPE 'void'"))
        .stdout(predicate::str::contains("EOS 'end-of-stream'"));
}

#[test]
fn print_round_trips_source() {
    let file = source_file("void main() {\n  print(42)\n}\n");
    opal()
        .arg("print")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("void main() {"))
        .stdout(predicate::str::contains("print(42)"));
}

#[test]
fn ir_lists_main_frame() {
    let file = source_file("void main() { print(7) }");
    opal()
        .arg("ir")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Frame 'main'"))
        .stdout(predicate::str::contains("PUSH(7)"))
        .stdout(predicate::str::contains("WRITE()"));
}

#[test]
fn program_input_flows_through_stdin() {
    let file = source_file(
        "void main() { \
           string name = input() \
           print(concat(\"hi \", name)) \
         }",
    );
    opal()
        .arg("run")
        .arg(file.path())
        .write_stdin("sam\n")
        .assert()
        .success()
        .stdout("hi sam");
}
