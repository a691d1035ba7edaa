use std::path::PathBuf;

use sb::config::{Config, SourceMode};
use sb::test_utils::{TestCase, run_table_tests};

use crate::common::fixture_path;

#[test]
fn config_source_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "default",
            input: "tests/fixtures/configs/default.toml",
            expected: (
                SourceMode::Live,
                PathBuf::from("skills.db"),
                PathBuf::from("skills.csv"),
                500u64,
            ),
            should_panic: false,
        },
        TestCase {
            name: "custom",
            input: "tests/fixtures/configs/custom.toml",
            expected: (
                SourceMode::Offline,
                PathBuf::from("skills.db"),
                PathBuf::from("/tmp/catalog/skills.csv"),
                250u64,
            ),
            should_panic: false,
        },
    ];

    run_table_tests(cases, |relative_path| {
        let config = Config::from_file(&fixture_path(relative_path)).expect("load config");
        (
            config.source.mode,
            config.source.database_path,
            config.source.feed_path,
            config.source.poll_interval_ms,
        )
    })?;
    Ok(())
}

#[test]
fn config_graph_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "default",
            input: "tests/fixtures/configs/default.toml",
            expected: ("None".to_string(), "elements".to_string()),
            should_panic: false,
        },
        TestCase {
            name: "custom",
            input: "tests/fixtures/configs/custom.toml",
            expected: ("-".to_string(), "mermaid".to_string()),
            should_panic: false,
        },
    ];

    run_table_tests(cases, |relative_path| {
        let config = Config::from_file(&fixture_path(relative_path)).expect("load config");
        (config.graph.sentinel, config.graph.default_format)
    })?;
    Ok(())
}

#[test]
fn config_load_merges_project_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        fixture_path("tests/fixtures/configs/custom.toml"),
        dir.path().join("config.toml"),
    )
    .unwrap();

    let config = Config::load(Some(&dir.path().join("config.toml")), dir.path()).unwrap();
    assert_eq!(config.source.mode, SourceMode::Offline);
    assert_eq!(config.graph.sentinel, "-");
}

#[test]
fn config_load_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(Some(&dir.path().join("absent.toml")), dir.path()).unwrap_err();
    assert!(matches!(err, sb::SbError::MissingConfig(_)));
}
