use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    run::{self, RunArgs},
    summarize::{self, SummarizeArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "cseval", about = "Conflict-seeker evaluation harness CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute every configuration in a run set against the external seeker.
    Run(RunArgs),
    /// Aggregate per-run artifacts into summary tables and aligned series.
    Summarize(SummarizeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Summarize(args) => summarize::run(&args),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
