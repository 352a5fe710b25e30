//! Integration tests for the command-line surface.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_rejects_out_of_range_threshold() {
    let mut cmd = cargo_bin_cmd!("feedercam");
    cmd.arg("--threshold").arg("1.5");

    cmd.assert().failure().stderr(predicate::str::contains(
        "confidence must be between 0.0 and 1.0",
    ));
}

#[test]
fn test_rejects_zero_visit_interval() {
    let mut cmd = cargo_bin_cmd!("feedercam");
    cmd.arg("--visit-interval").arg("0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("interval must be at least 1 second"));
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_tally_empty_storage() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("feedercam");
    cmd.arg("tally").arg("--storage").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No visits logged yet."));
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_tally_counts_logged_visits() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("visits.csv"),
        "timestamp,species,confidence\n\
         08/29/2026 07:00:00,Cardinalis cardinalis (Northern Cardinal),0.91\n\
         08/29/2026 07:03:00,Cyanocitta cristata (Blue Jay),0.80\n\
         08/29/2026 07:05:00,Cardinalis cardinalis (Northern Cardinal),0.88\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("feedercam");
    cmd.arg("tally").arg("--storage").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "2  Cardinalis cardinalis (Northern Cardinal)",
        ))
        .stdout(predicate::str::contains(
            "1  Cyanocitta cristata (Blue Jay)",
        ));
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_tally_rejects_corrupt_log() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("visits.csv"), "not,a\nvalid log").unwrap();

    let mut cmd = cargo_bin_cmd!("feedercam");
    cmd.arg("tally").arg("--storage").arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("visit log"));
}

#[test]
fn test_monitor_requires_model() {
    // No config file, no --model: validation must fail before any capture.
    let mut cmd = cargo_bin_cmd!("feedercam");
    cmd.env("XDG_CONFIG_HOME", "/nonexistent-config-root");

    cmd.assert().failure();
}
