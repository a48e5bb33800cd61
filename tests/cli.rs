use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn hdftable() -> Command {
    Command::cargo_bin("hdftable").unwrap()
}

#[test]
fn test_lists_flattened_columns() {
    hdftable()
        .arg("compound{a:i32,b:compound{x:u8,y:f32},c:vstr}")
        .assert()
        .success()
        .stdout(predicate::str::contains("columns:  4"))
        .stdout(predicate::str::contains("b.y"))
        .stdout(predicate::str::is_match(r"2\s+b\.y\s+base=1\s+group=1\s+numeric").unwrap())
        .stdout(predicate::str::is_match(r"3\s+c\s+base=2\s+group=3\s+string").unwrap());
}

#[test]
fn test_member_selection() {
    hdftable()
        .args(["compound{a:i32,b:compound{x:u8,y:f32},c:vstr}", "--members", "b.y,c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("columns:  2"))
        .stdout(predicate::str::contains("b.x").not());
}

#[test]
fn test_validate_accepts_and_rejects() {
    hdftable()
        .args(["compound{a:i32,b:compound{x:u8,y:f32}}", "--column", "1", "--validate", "255"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("ok\n"));

    hdftable()
        .args(["compound{a:i32,b:compound{x:u8,y:f32}}", "--column", "1", "--validate", "256"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Value out of range"));

    hdftable()
        .args(["u8", "--column", "3", "--validate", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_rejects_bad_expression() {
    hdftable()
        .arg("compound{a:i32")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid datatype expression"));
}

#[test]
fn test_log_file_written() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("hdftable.log");
    hdftable()
        .args(["array<u16>[2,2]", "--validate", "1 2 3 70000", "--log"])
        .arg(&log)
        .assert()
        .failure();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("Starting hdftable"));
    assert!(contents.contains("edit rejected"));
}
