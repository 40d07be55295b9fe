//! Integration tests for the run command.
use std::fs;
use std::path::{Path, PathBuf};
use transcap::commands::run_with_options;
use transcap::solver::SolveOptions;

/// Get the path to the simple demo case.
fn get_case_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("simple")
        .join("case.toml")
}

#[test]
fn test_run_simple_case() {
    let output_dir = tempfile::tempdir().unwrap();
    let output_path = output_dir.path().join("results");

    let code = run_with_options(
        &get_case_path(),
        Some("simple"),
        Some(&output_path),
        &SolveOptions::default(),
    );
    assert_eq!(code, 0);

    for file in [
        "flows.csv",
        "vehicle_stock.csv",
        "vehicle_purchases.csv",
        "mode_infrastructure.csv",
        "fueling_infrastructure.csv",
        "fueling_demand.csv",
    ] {
        assert!(output_path.join(file).is_file(), "{file} missing");
    }

    // The flows file carries the index tuple and the solved value
    let flows = fs::read_to_string(output_path.join("flows.csv")).unwrap();
    let mut lines = flows.lines();
    assert_eq!(
        lines.next().unwrap(),
        "product,odpair,path,tech_vehicle,year,flow"
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_run_invalid_case_exits_with_validation_code() {
    let dir = tempfile::tempdir().unwrap();
    let case_path = dir.path().join("broken.toml");
    fs::write(&case_path, "[scenario]\nbase_year = 2025\n").unwrap();

    let code = run_with_options(&case_path, None, None, &SolveOptions::default());
    assert_eq!(code, 2);
}

#[test]
fn test_run_missing_file_exits_nonzero() {
    let code = run_with_options(
        Path::new("no_such_case.toml"),
        None,
        None,
        &SolveOptions::default(),
    );
    assert_ne!(code, 0);
}
