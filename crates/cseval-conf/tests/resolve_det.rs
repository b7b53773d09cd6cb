use std::fs;
use std::path::PathBuf;

use cseval_conf::{load_seeker_config, resolve_config, ParamValue};
use cseval_core::{stable_hash_string, EvalError};

fn write_fixture(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

const COMMON: &str = r#"
[base.kb]
nameKB = "toy"
kbPath = "kb/toy.xml"

[base.cs]
maxNumConflicts = 2
limitParentsToResolved = true

[extinction]
extinctAfterXTimesNoConflict = 4

[weighting]
weightedConflicts = true
"#;

#[test]
fn resolution_is_deterministic() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_fixture(temp.path(), "original.toml", COMMON);

    let first = resolve_config(&path).expect("resolve");
    let second = resolve_config(&path).expect("resolve again");
    assert_eq!(first.render(), second.render());
    assert_eq!(
        stable_hash_string(&first).expect("hash"),
        stable_hash_string(&second).expect("hash"),
    );
}

#[test]
fn include_merge_prefers_including_file() {
    let temp = tempfile::tempdir().expect("tmp dir");
    write_fixture(temp.path(), "common.toml", COMMON);
    let path = write_fixture(
        temp.path(),
        "override.toml",
        r#"
include = "common.toml"

[base.ga]
mutationProbability = 0.3

[extinction]
stopAfterXExtinctions = 9
"#,
    );

    let flat = resolve_config(&path).expect("resolve");
    // Including file wins.
    assert_eq!(
        flat.get("base.ga.mutationProbability"),
        Some(&ParamValue::Float(0.3))
    );
    assert_eq!(
        flat.get("extinction.stopAfterXExtinctions"),
        Some(&ParamValue::Int(9))
    );
    // Included-only keys survive the merge.
    assert_eq!(
        flat.get("base.cs.maxNumConflicts"),
        Some(&ParamValue::Int(2))
    );
    assert_eq!(
        flat.get("extinction.extinctAfterXTimesNoConflict"),
        Some(&ParamValue::Int(4))
    );
}

#[test]
fn disabled_features_leave_no_keys() {
    let temp = tempfile::tempdir().expect("tmp dir");
    write_fixture(temp.path(), "common.toml", COMMON);
    let path = write_fixture(
        temp.path(),
        "base_only.toml",
        r#"
include = "common.toml"
enabled_features = ["base"]
"#,
    );

    let flat = resolve_config(&path).expect("resolve");
    assert!(!flat.is_empty());
    for (key, _) in flat.entries() {
        assert!(
            !key.starts_with("extinction.") && !key.starts_with("weighting."),
            "disabled feature leaked key {key}"
        );
    }
    assert!(flat.get("enabled_features").is_none());
}

#[test]
fn out_of_range_values_fail_validation() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_fixture(
        temp.path(),
        "broken.toml",
        r#"
[base.kb]
nameKB = "toy"
kbPath = "kb/toy.xml"

[base.cs]
maxNumConflicts = 0
limitParentsToResolved = true
"#,
    );

    let err = load_seeker_config(&path).expect_err("invalid range");
    match err {
        EvalError::Validation(info) => {
            assert!(info.context.contains_key("base.cs.maxNumConflicts"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unknown_feature_name_is_rejected() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_fixture(
        temp.path(),
        "unknown.toml",
        r#"
enabled_features = ["base", "turbo"]

[base.kb]
nameKB = "toy"
kbPath = "kb/toy.xml"

[base.cs]
limitParentsToResolved = false
"#,
    );

    let err = load_seeker_config(&path).expect_err("unknown feature");
    assert!(matches!(err, EvalError::Serde(_)));
}

#[test]
fn missing_file_is_reported() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let err = resolve_config(&temp.path().join("absent.toml")).expect_err("missing file");
    assert!(matches!(err, EvalError::MissingFile(_)));
}
