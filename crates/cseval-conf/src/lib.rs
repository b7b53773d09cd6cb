//! Layered configuration resolution for the conflict-seeker evaluation harness.

mod params;
mod resolve;
mod runner;
mod seeker;

pub use params::{ParamValue, ResolvedConfig};
pub use resolve::{load_seeker_config, resolve_config};
pub use runner::{
    load_runner_config, load_summary_config, RunSetSpec, RunnerConfig, SummaryConfig,
};
pub use seeker::{
    BaseSection, CsSection, ExtinctionSection, Feature, GaSection, KbSection, OutputSection,
    PopulationSection, SeekerConfig, WeightingSection,
};
