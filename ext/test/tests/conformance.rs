//! Conformance tests that run YAML fixtures against logroute
//!
//! Run with: cargo test -p logroute-test --test conformance

#![cfg(feature = "fixtures")]

use logroute_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture in one file.
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    let fixtures = Fixture::from_yaml_multi(&yaml)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()));
    assert!(!fixtures.is_empty(), "{} holds no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_severity() {
    run_fixture_file("01_severity.yaml");
}

#[test]
fn test_combinators() {
    run_fixture_file("02_combinators.yaml");
}

#[test]
fn test_text_and_time() {
    run_fixture_file("03_text_and_time.yaml");
}

#[test]
fn test_routing() {
    run_fixture_file("04_routing.yaml");
}

#[test]
fn every_fixture_file_is_covered() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec!["01_severity.yaml", "02_combinators.yaml", "03_text_and_time.yaml", "04_routing.yaml"]
    );
}
