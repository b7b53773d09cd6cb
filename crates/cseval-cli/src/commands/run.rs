use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use cseval_conf::load_runner_config;
use cseval_exec::Orchestrator;

use super::init_logging;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Runner configuration file, relative to the root.
    #[arg(long)]
    pub cfg: PathBuf,
    /// Project root every configured path resolves against.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_runner_config(&args.root.join(&args.cfg))?;
    init_logging(config.verbose);

    let working = args.root.join(&config.working_dir).join(&config.kb_name);
    let result_dir = working.join(&config.result_dirname);
    let orchestrator = Orchestrator::new(
        args.root.join(&config.gc_seeker),
        working.join(&config.conf_dirname),
        result_dir.clone(),
        config.runs_per_config,
        config.confs.include.clone(),
    );

    let report = orchestrator.run()?;
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(result_dir.join("run_report.json"), json)?;
    Ok(ExitCode::from(report.exit_code() as u8))
}
