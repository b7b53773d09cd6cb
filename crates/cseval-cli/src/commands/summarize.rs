use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use cseval_conf::load_summary_config;
use cseval_stats::{aggregate, align, collect_series, collect_summary_files, TimeUnit};

use super::init_logging;

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Summary configuration file, relative to the root.
    #[arg(long)]
    pub cfg: PathBuf,
    /// Project root every configured path resolves against.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// Emit debug-level logging.
    #[arg(long)]
    pub verbose: bool,
}

pub fn run(args: &SummarizeArgs) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_summary_config(&args.root.join(&args.cfg))?;
    init_logging(args.verbose);

    let summary_dir = args
        .root
        .join(&config.working_dir)
        .join(&config.summary_dirname);
    fs::create_dir_all(&summary_dir)?;

    for (kb_name, known_total) in &config.kbs {
        tracing::info!(
            "processing knowledge base '{}' ({} known conflict sets)",
            kb_name,
            known_total
        );
        let results_dir = args
            .root
            .join(&config.working_dir)
            .join(kb_name)
            .join(&config.result_dirname);

        let files = collect_summary_files(&results_dir, &config.eval_confs);
        if files.is_empty() {
            tracing::warn!("no summary files below {}", results_dir.display());
            continue;
        }
        for file in &files {
            tracing::info!("  {}", file.display());
        }
        let mut table = aggregate(&files, Some(*known_total))?;
        table.append_runtime_string()?;
        table.append_checks_per_cs(config.population_size)?;
        table.append_cs_per_time(TimeUnit::Minute)?;
        table.add_improvement_column(
            "cc_improv[%]",
            "checks_per_cs",
            &config.baseline,
            true,
            true,
        )?;
        table.add_improvement_column("cs_improv[%]", "found_cs", &config.baseline, true, false)?;
        table.add_improvement_column(
            "actual_improv[%]",
            "cs_per_min",
            &config.baseline,
            true,
            false,
        )?;
        if !config.export_names.is_empty() {
            table.set_export_names(&config.export_names)?;
        }
        table.rename_column("cc_improv[%]", "cc_improv_pct")?;
        table.rename_column("cs_improv[%]", "cs_improv_pct")?;
        table.rename_column("actual_improv[%]", "actual_improv_pct")?;
        table.rename_column("runtime[m:s:ms]", "runtime")?;
        let summary_path = summary_dir.join(format!("{kb_name}_summary.csv"));
        table.write_csv(&summary_path)?;
        tracing::info!("wrote {}", summary_path.display());

        for conf in &config.eval_confs {
            let directory = results_dir.join(conf);
            let series = match collect_series(&directory) {
                Ok(series) => series,
                Err(err) => {
                    tracing::warn!("skipping '{}': {}", conf, err);
                    continue;
                }
            };
            let aligned = align(series, config.expected_generations);
            let mean_path = summary_dir.join(format!("{kb_name}_{conf}_average_stats.csv"));
            aligned.mean(config.expected_generations).write_csv(&mean_path)?;
            let std_path = summary_dir.join(format!("{kb_name}_{conf}_std_stats.csv"));
            aligned.std_dev(config.expected_generations).write_csv(&std_path)?;
            tracing::info!("wrote {} and {}", mean_path.display(), std_path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
