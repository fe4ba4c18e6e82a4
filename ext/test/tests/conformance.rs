//! Conformance tests that run YAML fixtures against deepmatch
//!
//! Run with: cargo test -p deepmatch-test --test conformance

use deepmatch_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture of one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {e}", path.display());
    });
    assert!(!fixtures.is_empty(), "{} holds no fixture", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_structural() {
    run_fixture_file("01_structural.yaml");
}

#[test]
fn test_operators() {
    run_fixture_file("02_operators.yaml");
}

#[test]
fn test_composition() {
    run_fixture_file("03_composition.yaml");
}

#[test]
fn test_settings() {
    run_fixture_file("04_settings.yaml");
}

#[test]
fn test_every_fixture_file_is_run() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let ext = path.extension()?;
            (ext == "yaml" || ext == "yml")
                .then(|| path.file_name()?.to_str().map(str::to_string))
                .flatten()
        })
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "01_structural.yaml",
            "02_operators.yaml",
            "03_composition.yaml",
            "04_settings.yaml"
        ]
    );
}
