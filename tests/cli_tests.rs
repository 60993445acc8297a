use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::{NamedTempFile, tempdir};

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

fn write_sample_csv() -> NamedTempFile {
    let csv = [
        "name,events hotels - hotelid__name,events hotelrooms - requiresitem__name,regular_checkin,regular_checkout,realeventstartdate,orders orderitems__quantity",
        "Autumn Gala,Grand Hotel,Double,2024-01-10,2024-01-13,2024-01-10,2",
        "Spring Expo,Harbor Inn,Twin,2024-03-01,2024-03-03,2024-03-01,1",
    ]
    .join("\n");
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(csv.as_bytes()).expect("write csv");
    file
}

#[test]
fn cli_shows_help() {
    run_cli("help\nquit\n")
        .success()
        .stdout(str_contains("Load a raw CSV booking export"));
}

#[test]
fn cli_reports_load_errors_and_keeps_running() {
    run_cli("load /no/such/file.csv\nhelp\nquit\n")
        .success()
        .stdout(str_contains("Error:"))
        .stdout(str_contains("Commands:"));
}

#[test]
fn cli_load_lists_events_and_pivots_selection() {
    let file = write_sample_csv();
    let script = format!(
        "load {}\nevents\nselect Autumn Gala\npivot\nquit\n",
        file.path().display()
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Export loaded"))
        .stdout(str_contains("Autumn Gala"))
        .stdout(str_contains("Spring Expo"))
        .stdout(str_contains("Pivot for 2024-01-10"))
        .stdout(str_contains("2024-01-12"))
        .stdout(str_contains("Done (partitions=1"));
}

#[test]
fn cli_pivot_without_selection_renders_nothing() {
    let file = write_sample_csv();
    let script = format!("load {}\npivot\nquit\n", file.path().display());
    run_cli(&script)
        .success()
        .stdout(str_contains("No events selected; nothing to pivot."));
}

#[test]
fn cli_rejects_unknown_event_selection() {
    let file = write_sample_csv();
    let script = format!(
        "load {}\nselect Winter Ball\nquit\n",
        file.path().display()
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Unknown event 'Winter Ball'"));
}

#[test]
fn cli_saves_pivot_csvs_per_event_date() {
    let file = write_sample_csv();
    let dir = tempdir().expect("create temp dir");
    let script = format!(
        "load {}\nselect Autumn Gala\nselect Spring Expo\nsave pivots {}\nquit\n",
        file.path().display(),
        dir.path().display()
    );
    run_cli(&script).success().stdout(str_contains("Wrote"));

    assert!(dir.path().join("pivot_2024-01-10.csv").exists());
    assert!(dir.path().join("pivot_2024-03-01.csv").exists());
}

#[test]
fn cli_json_snapshot_round_trip() {
    let file = write_sample_csv();
    let snapshot = NamedTempFile::new().expect("create temp file");
    let script = format!(
        "load {}\nsave json {}\nload json {}\nevents\nquit\n",
        file.path().display(),
        snapshot.path().display(),
        snapshot.path().display()
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Export saved to"))
        .stdout(str_contains("Autumn Gala"));
}
