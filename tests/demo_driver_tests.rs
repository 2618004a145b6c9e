//! End-to-end tests for the CSV demo driver
//!
//! Each test writes an operation script to a temporary file, runs it
//! through `driver::run_script` with a real worker pool, and compares the
//! final account-state CSV byte for byte.

use ledger_engine::core::LedgerConfig;
use ledger_engine::driver::run_script;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn config(workers: usize) -> LedgerConfig {
    LedgerConfig {
        workers,
        idle_wait: Duration::from_millis(1),
        lock_timeout: Duration::from_millis(100),
    }
}

fn run(script: &str, workers: usize) -> String {
    let mut input = NamedTempFile::new().expect("temp file");
    input.write_all(script.as_bytes()).expect("write script");
    input.flush().expect("flush script");

    let mut output = Vec::new();
    run_script(input.path(), config(workers), &mut output).expect("script must run");
    String::from_utf8(output).expect("utf8 output")
}

#[test]
fn test_happy_path_script() {
    let script = "\
op,account,to,amount
open,1,,
open,2,,
deposit,1,,100.00
withdraw,1,,30
transfer,1,2,10
";
    let output = run(script, 2);
    assert_eq!(
        output,
        "account,balance,last_transaction_id\n1,60.00,3\n2,10,0\n"
    );
}

#[test]
fn test_malformed_and_rejected_rows_are_skipped() {
    let script = "\
op,account,to,amount
open,1,,
dispute,1,,5
deposit,1,,not-a-number
deposit,9,,5
deposit,1,,-3
deposit,1,,25
";
    // Unknown op, bad amount, unopened label and negative amount are all
    // skipped; the final valid deposit still applies.
    let output = run(script, 1);
    assert_eq!(output, "account,balance,last_transaction_id\n1,25,1\n");
}

#[test]
fn test_insufficient_withdraw_settles_invalid() {
    let script = "\
op,account,to,amount
open,1,,
open,2,,
deposit,1,,50
transfer,1,2,20
withdraw,2,,999
";
    // The oversized withdrawal becomes Invalid at apply time and leaves
    // account 2 untouched.
    let output = run(script, 2);
    assert_eq!(
        output,
        "account,balance,last_transaction_id\n1,30,2\n2,20,0\n"
    );
}
