use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::NamedTempFile;

// ============================================================================
// END-TO-END COMMAND FILE RUNS
// ============================================================================

#[test]
fn test_open_deposit_withdraw() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(
        temp_file.path(),
        "op,account,to,user,kind,amount,currency,description\n\
         open,a,,u1,checking,,USD,\n\
         deposit,a,,,,100.00,USD,payday\n\
         withdraw,a,,,,40.50,USD,\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("financial-ledger").unwrap();
    let output = cmd
        .arg(temp_file.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let output_str = String::from_utf8(output).unwrap();
    assert!(output_str.contains("account,user,type,currency,status,balance"));
    assert!(output_str.contains("a,u1,checking,USD,active,59.5000"));
}

#[test]
fn test_transfer_between_accounts() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(
        temp_file.path(),
        "op,account,to,user,kind,amount,currency,description\n\
         open,src,,u1,checking,,USD,\n\
         open,dst,,u2,savings,,USD,\n\
         deposit,src,,,,500.00,USD,\n\
         transfer,src,dst,,,200.50,USD,rent\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("financial-ledger").unwrap();
    let output = cmd
        .arg(temp_file.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let output_str = String::from_utf8(output).unwrap();
    assert!(output_str.contains("src,u1,checking,USD,active,299.5000"));
    assert!(output_str.contains("dst,u2,savings,USD,active,200.5000"));
}

#[test]
fn test_rejected_operations_are_skipped() {
    let temp_file = NamedTempFile::new().unwrap();
    // Insufficient funds, currency mismatch and an unknown label: each row
    // is skipped without poisoning the rest of the run.
    fs::write(
        temp_file.path(),
        "op,account,to,user,kind,amount,currency,description\n\
         open,a,,u1,checking,,USD,\n\
         withdraw,a,,,,10.00,USD,\n\
         deposit,a,,,,5.00,EUR,\n\
         deposit,ghost,,,,5.00,USD,\n\
         deposit,a,,,,25.00,USD,\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("financial-ledger").unwrap();
    let output = cmd
        .arg(temp_file.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let output_str = String::from_utf8(output).unwrap();
    assert!(output_str.contains("a,u1,checking,USD,active,25.0000"));
}

#[test]
fn test_frozen_account_rejects_activity() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(
        temp_file.path(),
        "op,account,to,user,kind,amount,currency,description\n\
         open,a,,u1,checking,,USD,\n\
         deposit,a,,,,100.00,USD,\n\
         freeze,a,,,,,,\n\
         withdraw,a,,,,50.00,USD,\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("financial-ledger").unwrap();
    let output = cmd
        .arg(temp_file.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let output_str = String::from_utf8(output).unwrap();
    assert!(output_str.contains("a,u1,checking,USD,frozen,100.0000"));
}

#[test]
fn test_empty_file() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(
        temp_file.path(),
        "op,account,to,user,kind,amount,currency,description\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("financial-ledger").unwrap();
    cmd.arg(temp_file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "account,user,type,currency,status,balance",
        ));
}

#[test]
fn test_missing_input_file() {
    let mut cmd = Command::cargo_bin("financial-ledger").unwrap();
    cmd.arg("nonexistent.csv").assert().failure();
}

#[test]
fn test_journal_persists_across_runs() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let journal = temp_dir.path().join("cli.journal");

    let first = NamedTempFile::new().unwrap();
    fs::write(
        first.path(),
        "op,account,to,user,kind,amount,currency,description\n\
         open,a,,u1,checking,,USD,\n\
         deposit,a,,,,100.00,USD,\n",
    )
    .unwrap();

    Command::cargo_bin("financial-ledger")
        .unwrap()
        .arg(first.path())
        .arg("--journal")
        .arg(&journal)
        .assert()
        .success();

    // Second run sees the journaled account only through its own labels, so
    // it opens a fresh one; the journal still replays without error and the
    // new account coexists with the recovered state.
    let second = NamedTempFile::new().unwrap();
    fs::write(
        second.path(),
        "op,account,to,user,kind,amount,currency,description\n\
         open,b,,u2,savings,,USD,\n\
         deposit,b,,,,40.00,USD,\n",
    )
    .unwrap();

    let output = Command::cargo_bin("financial-ledger")
        .unwrap()
        .arg(second.path())
        .arg("--journal")
        .arg(&journal)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let output_str = String::from_utf8(output).unwrap();
    assert!(output_str.contains("b,u2,savings,USD,active,40.0000"));
}
