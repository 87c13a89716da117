use assert_cmd::Command;
use predicates::str::{contains, diff, is_empty};

fn stepvm() -> Command {
    Command::cargo_bin("stepvm").unwrap()
}

#[test]
fn assembles_to_stdout() {
    let mut cmd = stepvm();
    cmd.arg("assemble").arg("tests/files/countdown.as").arg("-");

    cmd.assert()
        .success()
        .stdout(diff(include_str!("files/countdown.mx")))
        .stderr(contains("Assembling"));
}

#[test]
fn assembles_from_stdin() {
    let mut cmd = stepvm();
    cmd.arg("assemble")
        .arg("-")
        .arg("-")
        .write_stdin(include_str!("files/store.as"));

    cmd.assert()
        .success()
        .stdout(diff("2a0002\n050102\n010005\n00010b\n000001\n"));
}

#[test]
fn assembles_to_file() {
    let out = std::env::temp_dir().join(format!("stepvm-countdown-{}.mx", std::process::id()));

    let mut cmd = stepvm();
    cmd.arg("assemble").arg("tests/files/countdown.as").arg(&out);
    cmd.assert().success().stdout(is_empty());

    let written = std::fs::read_to_string(&out).unwrap();
    std::fs::remove_file(&out).unwrap();
    assert_eq!(written, include_str!("files/countdown.mx"));
}

#[test]
fn duplicate_label_fails_without_output() {
    let mut cmd = stepvm();
    cmd.arg("assemble").arg("tests/files/duplicate.as").arg("-");

    cmd.assert()
        .failure()
        .stdout(is_empty())
        .stderr(contains("Duplicate label `start`"));
}

#[test]
fn labels_only_assemble_to_nothing() {
    let mut cmd = stepvm();
    cmd.arg("assemble").arg("-").arg("-").write_stdin("start:\nend:\n");
    cmd.assert().success().stdout(is_empty());
}

#[test]
fn missing_source_fails() {
    let mut cmd = stepvm();
    cmd.arg("assemble").arg("tests/files/nonexistent.as").arg("-");
    cmd.assert().failure().stdout(is_empty());
}

#[test]
fn runs_countdown() {
    let mut cmd = stepvm();
    cmd.arg("run").arg("tests/files/countdown.mx").arg("--minimal");

    cmd.assert()
        .success()
        .stdout(diff(include_str!("expected/countdown_run")))
        .stderr(is_empty());
}

#[test]
fn run_shows_status() {
    let mut cmd = stepvm();
    cmd.arg("run").arg("tests/files/countdown.mx");

    cmd.assert()
        .success()
        .stdout(contains("R000001 = 000001"))
        .stderr(contains("Running"))
        .stderr(contains("Completed"));
}

#[test]
fn runs_assembled_from_stdin() {
    let mut assemble = stepvm();
    assemble
        .arg("assemble")
        .arg("-")
        .arg("-")
        .write_stdin(include_str!("files/store.as"));
    let program = assemble.assert().success().get_output().stdout.clone();

    let mut cmd = stepvm();
    cmd.arg("run").arg("-").arg("--minimal").write_stdin(program);

    cmd.assert()
        .success()
        .stdout(contains("00002a\nIP"))
        .stdout(contains("000004:   000001  00002a  000000  000000"));
}

#[test]
fn run_reports_fault() {
    let mut cmd = stepvm();
    cmd.arg("run").arg("tests/files/fault.mx").arg("--minimal");

    cmd.assert()
        .failure()
        .stderr(contains("Invalid address 000100 at 000003"));
}

#[test]
fn run_rejects_malformed_program() {
    let mut cmd = stepvm();
    // Source text is not an encoded program
    cmd.arg("run").arg("tests/files/countdown.as").arg("--minimal");

    cmd.assert()
        .failure()
        .stdout(is_empty())
        .stderr(contains("Malformed instruction word"));
}
