use assert_cmd::Command;
use predicates::str::{contains, diff, is_empty};

fn debug(commands: &str) -> Command {
    let mut cmd = Command::cargo_bin("stepvm").unwrap();
    cmd.arg("debug")
        .arg("tests/files/countdown.mx")
        .arg("--minimal")
        .arg("--command")
        .arg(commands);
    cmd
}

#[test]
fn stops_at_breakpoint() {
    debug("b 2;r;d;s;c 2;r")
        .assert()
        .success()
        .stdout(diff(include_str!("expected/countdown_debug")))
        .stderr(is_empty());
}

#[test]
fn memory_lists_breakpoints() {
    debug("b 5;r;m;q")
        .assert()
        .success()
        .stdout(contains("000004:   020009  00000c  000000  000000"))
        .stdout(contains("------\n000005: hlt | 0 | 0\n"));
}

#[test]
fn quit_stops_before_executing() {
    debug("q")
        .assert()
        .success()
        .stdout(diff(concat!(
            "IP      = 000000\n",
            "R000000 = 000000\n",
            "R000001 = 000000\n",
            "R000002 = 000000\n",
            "R000003 = 000000\n",
            "000000:   030002  010102  00000a  010007\n",
            "000004:   020009  000001  000000  000000\n",
        )));
}

#[test]
fn steps_one_instruction() {
    debug("s;s;s;q")
        .assert()
        .success()
        .stdout(contains("000003\nIP      = 000003\nR000000 = 000003\n"));
}

#[test]
fn end_of_commands_quits() {
    debug("n")
        .assert()
        .success()
        .stdout(contains("IP      = 000001\nR000000 = 000003\n"));
}

#[test]
fn reports_invalid_commands() {
    debug("x;b 0x100;b foo;b 1 2;q")
        .assert()
        .success()
        .stdout(contains("Unknown command 'x'"))
        .stdout(contains("In command `break`"))
        .stdout(contains("Malformed integer"));
}

#[test]
fn reads_commands_from_stdin() {
    let mut cmd = Command::cargo_bin("stepvm").unwrap();
    cmd.arg("debug")
        .arg("tests/files/countdown.mx")
        .arg("--minimal")
        .write_stdin("b 2\nr\nd\n");

    // End of input quits at the breakpoint
    cmd.assert()
        .success()
        .stdout(contains("000000 [bcdmnqrs]> 000000 [bcdmnqrs]> 000002 [bcdmnqrs]> "))
        .stdout(contains("prr | 0 | 0\n000002 [bcdmnqrs]> IP      = 000002\n"))
        .stderr(is_empty());
}

#[test]
fn rejects_stdin_for_program_and_commands() {
    let mut cmd = Command::cargo_bin("stepvm").unwrap();
    cmd.arg("debug").arg("-").arg("--minimal");
    cmd.assert().failure().stdout(is_empty());
}
