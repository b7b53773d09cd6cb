use std::fs;
use std::path::PathBuf;

use cseval_core::EvalError;
use cseval_stats::{aggregate, collect_summary_files, Cell, TimeUnit};

fn write_summary(dir: &std::path::Path, name: &str, rows: &[(u32, u32, u32, u32)]) -> PathBuf {
    let mut contents = String::from("total_populations,total_gens,found_cs,runtime[ms]\n");
    for (pops, gens, found, runtime) in rows {
        contents.push_str(&format!("{pops},{gens},{found},{runtime}\n"));
    }
    let path = dir.join(format!("summary_{name}.csv"));
    fs::write(&path, contents).expect("write summary fixture");
    path
}

fn float(cell: &Cell) -> f64 {
    cell.as_f64().expect("numeric cell")
}

#[test]
fn aggregate_computes_means_and_spread() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_summary(
        temp.path(),
        "original",
        &[(10, 100, 5, 60_000), (10, 100, 6, 60_000), (10, 100, 7, 60_000)],
    );

    let table = aggregate(&[path], Some(10)).expect("aggregate");
    assert_eq!(table.rows().len(), 1);
    assert_eq!(
        table.value(0, "config_name"),
        Some(&Cell::Text("original".to_string()))
    );
    assert!((float(table.value(0, "found_cs").unwrap()) - 6.0).abs() < 1e-9);
    // Population variance of [5, 6, 7] is 2/3, rounded to 3 decimals.
    assert!((float(table.value(0, "variance").unwrap()) - 0.667).abs() < 1e-9);
    assert!((float(table.value(0, "std_dev").unwrap()) - 0.816).abs() < 1e-9);
    assert!((float(table.value(0, "identification_rate").unwrap()) - 0.600).abs() < 1e-9);
    assert_eq!(table.value(0, "found_all_cs"), Some(&Cell::Int(0)));
}

#[test]
fn found_all_counts_exact_matches() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_summary(
        temp.path(),
        "weighted",
        &[(10, 80, 8, 30_000), (10, 80, 10, 30_000), (10, 80, 10, 30_000)],
    );

    let table = aggregate(&[path], Some(10)).expect("aggregate");
    assert_eq!(table.value(0, "found_all_cs"), Some(&Cell::Int(2)));
}

#[test]
fn derived_columns_follow_the_recipe() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_summary(
        temp.path(),
        "original",
        &[(10, 100, 5, 60_000), (10, 100, 6, 60_000), (10, 100, 7, 60_000)],
    );

    let mut table = aggregate(&[path], None).expect("aggregate");
    table.append_runtime_string().expect("runtime string");
    table.append_checks_per_cs(100).expect("checks per cs");
    table.append_cs_per_time(TimeUnit::Minute).expect("cs per minute");

    assert_eq!(
        table.value(0, "runtime[m:s:ms]"),
        Some(&Cell::Text("1:0:0".to_string()))
    );
    // 100 generations x 100 individuals / 6 discoveries.
    assert!((float(table.value(0, "checks_per_cs").unwrap()) - 1666.67).abs() < 1e-9);
    // 6 discoveries in one minute.
    assert!((float(table.value(0, "cs_per_min").unwrap()) - 6.0).abs() < 1e-9);
}

#[test]
fn improvement_is_zero_for_the_baseline_row() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let original = write_summary(
        temp.path(),
        "original",
        &[(10, 100, 6, 60_000), (10, 100, 6, 60_000)],
    );
    let weighted = write_summary(
        temp.path(),
        "weighted",
        &[(10, 100, 9, 30_000), (10, 100, 9, 30_000)],
    );

    let mut table = aggregate(&[original, weighted], None).expect("aggregate");
    table
        .add_improvement_column("cs_improv[%]", "found_cs", "original", true, false)
        .expect("improvement");

    assert!((float(table.value(0, "cs_improv[%]").unwrap())).abs() < 1e-9);
    // (9 - 6) / 6 x 100.
    assert!((float(table.value(1, "cs_improv[%]").unwrap()) - 50.0).abs() < 1e-9);
}

#[test]
fn improvement_polarity_and_absolute_mode() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let original = write_summary(temp.path(), "original", &[(10, 100, 6, 60_000)]);
    let faster = write_summary(temp.path(), "faster", &[(10, 50, 6, 60_000)]);

    let mut table = aggregate(&[original, faster], None).expect("aggregate");
    table
        .add_improvement_column("gens_improv[%]", "total_gens", "original", true, true)
        .expect("percent improvement");
    table
        .add_improvement_column("gens_delta", "total_gens", "original", false, true)
        .expect("absolute improvement");

    // Lower is better: (100 - 50) / 100 x 100 = 50.
    assert!((float(table.value(1, "gens_improv[%]").unwrap()) - 50.0).abs() < 1e-9);
    assert!((float(table.value(1, "gens_delta").unwrap()) - 50.0).abs() < 1e-9);
    assert!((float(table.value(0, "gens_delta").unwrap())).abs() < 1e-9);
}

#[test]
fn improvement_column_lands_after_its_target() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_summary(temp.path(), "original", &[(10, 100, 6, 60_000)]);

    let mut table = aggregate(&[path], None).expect("aggregate");
    table
        .add_improvement_column("cs_improv[%]", "found_cs", "original", true, false)
        .expect("improvement");

    let columns = table.columns();
    let target = columns.iter().position(|c| c == "found_cs").unwrap();
    assert_eq!(columns[target + 1], "cs_improv[%]");
}

#[test]
fn unknown_baseline_is_a_checked_error() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = write_summary(temp.path(), "original", &[(10, 100, 6, 60_000)]);

    let mut table = aggregate(&[path], None).expect("aggregate");
    let err = table
        .add_improvement_column("cs_improv[%]", "found_cs", "does_not_exist", true, false)
        .expect_err("unknown baseline");
    assert!(matches!(err, EvalError::Baseline(_)));
}

#[test]
fn collect_finds_only_existing_summaries() {
    let temp = tempfile::tempdir().expect("tmp dir");
    write_summary(temp.path(), "original", &[(10, 100, 6, 60_000)]);

    let names = vec!["original".to_string(), "missing".to_string()];
    let files = collect_summary_files(temp.path(), &names);
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("summary_original.csv"));
}
