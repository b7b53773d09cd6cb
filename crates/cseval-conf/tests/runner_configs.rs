use std::fs;
use std::path::PathBuf;

use cseval_conf::{load_runner_config, load_summary_config};
use cseval_core::EvalError;

fn write_fixture(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn runner_config_reads_the_runner_table() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_fixture(
        temp.path(),
        "runner.toml",
        r#"
[runner]
gc_seeker = "tools/seeker"
working_dir = "evals"
kb_name = "busybox"
conf_dirname = "confs"
result_dirname = "results"
runs_per_config = 3

[runner.confs]
include = ["original.toml", "ext_*.toml"]
"#,
    );

    let config = load_runner_config(&path).expect("load runner config");
    assert_eq!(config.kb_name, "busybox");
    assert_eq!(config.runs_per_config, 3);
    assert!(!config.verbose);
    assert_eq!(config.confs.include.len(), 2);
}

#[test]
fn runner_table_is_required() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_fixture(temp.path(), "runner.toml", "kb_name = \"busybox\"\n");

    let err = load_runner_config(&path).expect_err("missing table");
    assert!(matches!(err, EvalError::Validation(_)));
}

#[test]
fn summary_config_defaults_are_applied() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_fixture(
        temp.path(),
        "summary.toml",
        r#"
working_dir = "evals"
result_dirname = "results"
summary_dirname = "summary"
eval_confs = ["original", "weighted"]

[kbs]
busybox = 12
"#,
    );

    let config = load_summary_config(&path).expect("load summary config");
    assert_eq!(config.baseline, "original");
    assert_eq!(config.population_size, 100);
    assert_eq!(config.expected_generations, 100);
    assert_eq!(config.kbs.get("busybox"), Some(&12));
}
