use cseval_core::{ErrorInfo, EvalError};
use serde::{Deserialize, Serialize};

use crate::params::{ParamValue, ResolvedConfig};

/// Closed set of optional feature blocks recognized by the resolver.
///
/// The `enabled_features` allow-list deserializes directly into this
/// enumeration, so an unknown feature name is rejected while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Base,
    Extinction,
    Weighting,
}

/// Knowledge base reference consumed by the seeker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbSection {
    #[serde(rename = "nameKB")]
    pub name_kb: String,
    #[serde(rename = "kbPath")]
    pub kb_path: String,
}

/// Output behaviour toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OutputSection {
    #[serde(default)]
    pub print_result: bool,
}

/// Genetic algorithm parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaSection {
    /// Probability of leaving a feature unconstrained, in `[0, 1]`.
    #[serde(default = "default_no_preference_probability")]
    pub no_preference_probability: f64,
    /// Mutation probability, in `[0, 1]`.
    #[serde(default = "default_mutation_probability")]
    pub mutation_probability: f64,
    /// Upper bound on features per user requirement, at least 10.
    #[serde(default = "default_max_features_in_ur", rename = "maxFeaturesInUR")]
    pub max_features_in_ur: i64,
}

fn default_no_preference_probability() -> f64 {
    0.7
}

fn default_mutation_probability() -> f64 {
    0.1
}

fn default_max_features_in_ur() -> i64 {
    100
}

impl Default for GaSection {
    fn default() -> Self {
        Self {
            no_preference_probability: default_no_preference_probability(),
            mutation_probability: default_mutation_probability(),
            max_features_in_ur: default_max_features_in_ur(),
        }
    }
}

/// Population sizing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationSection {
    /// Individuals per generation, at least 1.
    #[serde(default = "default_population_size")]
    pub population_size: i64,
    /// Generation cap, at least 1.
    #[serde(default = "default_max_num_generations")]
    pub max_num_generations: i64,
}

fn default_population_size() -> i64 {
    100
}

fn default_max_num_generations() -> i64 {
    100
}

impl Default for PopulationSection {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            max_num_generations: default_max_num_generations(),
        }
    }
}

/// Conflict-set discovery parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsSection {
    /// Number of conflicts sought per run, at least 1.
    #[serde(default = "default_max_num_conflicts")]
    pub max_num_conflicts: i64,
    pub limit_parents_to_resolved: bool,
    /// When `no`, the seeker skips the conflict-set file that includes
    /// candidate features, and the orchestrator omits its output path.
    #[serde(default = "default_cf_in_conflicts")]
    pub cf_in_conflicts: bool,
}

fn default_max_num_conflicts() -> i64 {
    1
}

fn default_cf_in_conflicts() -> bool {
    true
}

/// Mandatory parameter block for the seeker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSection {
    pub kb: KbSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub ga: GaSection,
    #[serde(default)]
    pub population: PopulationSection,
    pub cs: CsSection,
}

/// Extinction feature block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtinctionSection {
    #[serde(default = "default_extinct_after")]
    pub extinct_after_x_times_no_conflict: i64,
    #[serde(default = "default_stop_after")]
    pub stop_after_x_extinctions: i64,
}

fn default_extinct_after() -> i64 {
    5
}

fn default_stop_after() -> i64 {
    5
}

impl Default for ExtinctionSection {
    fn default() -> Self {
        Self {
            extinct_after_x_times_no_conflict: default_extinct_after(),
            stop_after_x_extinctions: default_stop_after(),
        }
    }
}

/// Weighting feature block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightingSection {
    #[serde(default)]
    pub weighted_conflicts: bool,
    #[serde(default)]
    pub avoid_same_original_conflict: bool,
    #[serde(default)]
    pub weighted_crossover: bool,
    /// Crossover weighting factor, at least 1.
    #[serde(default = "default_weighted_crossover_factor")]
    pub weighted_crossover_factor: i64,
}

fn default_weighted_crossover_factor() -> i64 {
    2
}

impl Default for WeightingSection {
    fn default() -> Self {
        Self {
            weighted_conflicts: false,
            avoid_same_original_conflict: false,
            weighted_crossover: false,
            weighted_crossover_factor: default_weighted_crossover_factor(),
        }
    }
}

/// Seeker configuration after include merging.
///
/// A feature block disabled through `enabled_features` is absent (`None`),
/// never zeroed, so its keys cannot leak into the flattened output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeekerConfig {
    #[serde(default)]
    pub enabled_features: Option<Vec<Feature>>,
    #[serde(default)]
    pub base: Option<BaseSection>,
    #[serde(default)]
    pub extinction: Option<ExtinctionSection>,
    #[serde(default)]
    pub weighting: Option<WeightingSection>,
}

impl SeekerConfig {
    /// Checks every schema constraint, reporting all violations at once.
    pub fn validate(&self) -> Result<(), EvalError> {
        let mut violations: Vec<(String, String)> = Vec::new();
        if let Some(base) = &self.base {
            if base.kb.name_kb.trim().is_empty() {
                violations.push(("base.kb.nameKB".into(), "must not be empty".into()));
            }
            if base.kb.kb_path.trim().is_empty() {
                violations.push(("base.kb.kbPath".into(), "must not be empty".into()));
            }
            if !(0.0..=1.0).contains(&base.ga.no_preference_probability) {
                violations.push((
                    "base.ga.noPreferenceProbability".into(),
                    "must be within [0, 1]".into(),
                ));
            }
            if !(0.0..=1.0).contains(&base.ga.mutation_probability) {
                violations.push((
                    "base.ga.mutationProbability".into(),
                    "must be within [0, 1]".into(),
                ));
            }
            if base.ga.max_features_in_ur < 10 {
                violations.push((
                    "base.ga.maxFeaturesInUR".into(),
                    "must be at least 10".into(),
                ));
            }
            if base.population.population_size < 1 {
                violations.push((
                    "base.population.populationSize".into(),
                    "must be at least 1".into(),
                ));
            }
            if base.population.max_num_generations < 1 {
                violations.push((
                    "base.population.maxNumGenerations".into(),
                    "must be at least 1".into(),
                ));
            }
            if base.cs.max_num_conflicts < 1 {
                violations.push((
                    "base.cs.maxNumConflicts".into(),
                    "must be at least 1".into(),
                ));
            }
        }
        if let Some(weighting) = &self.weighting {
            if weighting.weighted_crossover_factor < 1 {
                violations.push((
                    "weighting.weightedCrossoverFactor".into(),
                    "must be at least 1".into(),
                ));
            }
        }
        if violations.is_empty() {
            return Ok(());
        }
        let mut info = ErrorInfo::new(
            "conf.constraints",
            format!("{} configuration constraint(s) violated", violations.len()),
        );
        for (field, constraint) in violations {
            info = info.with_context(field, constraint);
        }
        Err(EvalError::Validation(info))
    }

    /// Flattens the configuration into dotted-path parameters.
    ///
    /// Traversal follows declaration order, disabled blocks contribute
    /// nothing, and the `enabled_features` control list never appears.
    pub fn flatten(&self) -> ResolvedConfig {
        let mut out = ResolvedConfig::new();
        if let Some(base) = &self.base {
            out.insert("base.kb.nameKB", base.kb.name_kb.as_str());
            out.insert("base.kb.kbPath", base.kb.kb_path.as_str());
            out.insert(
                "base.output.printResult",
                ParamValue::from_bool(base.output.print_result),
            );
            out.insert(
                "base.ga.noPreferenceProbability",
                base.ga.no_preference_probability,
            );
            out.insert("base.ga.mutationProbability", base.ga.mutation_probability);
            out.insert("base.ga.maxFeaturesInUR", base.ga.max_features_in_ur);
            out.insert(
                "base.population.populationSize",
                base.population.population_size,
            );
            out.insert(
                "base.population.maxNumGenerations",
                base.population.max_num_generations,
            );
            out.insert("base.cs.maxNumConflicts", base.cs.max_num_conflicts);
            out.insert(
                "base.cs.limitParentsToResolved",
                ParamValue::from_bool(base.cs.limit_parents_to_resolved),
            );
            out.insert(
                "base.cs.cfInConflicts",
                ParamValue::from_bool(base.cs.cf_in_conflicts),
            );
        }
        if let Some(extinction) = &self.extinction {
            out.insert(
                "extinction.extinctAfterXTimesNoConflict",
                extinction.extinct_after_x_times_no_conflict,
            );
            out.insert(
                "extinction.stopAfterXExtinctions",
                extinction.stop_after_x_extinctions,
            );
        }
        if let Some(weighting) = &self.weighting {
            out.insert(
                "weighting.weightedConflicts",
                ParamValue::from_bool(weighting.weighted_conflicts),
            );
            out.insert(
                "weighting.avoidSameOriginalConflict",
                ParamValue::from_bool(weighting.avoid_same_original_conflict),
            );
            out.insert(
                "weighting.weightedCrossover",
                ParamValue::from_bool(weighting.weighted_crossover),
            );
            out.insert(
                "weighting.weightedCrossoverFactor",
                weighting.weighted_crossover_factor,
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_base() -> BaseSection {
        BaseSection {
            kb: KbSection {
                name_kb: "toy".to_string(),
                kb_path: "kb/toy.xml".to_string(),
            },
            output: OutputSection::default(),
            ga: GaSection::default(),
            population: PopulationSection::default(),
            cs: CsSection {
                max_num_conflicts: 1,
                limit_parents_to_resolved: false,
                cf_in_conflicts: true,
            },
        }
    }

    #[test]
    fn validation_collects_every_violation() {
        let mut base = minimal_base();
        base.ga.mutation_probability = 1.5;
        base.cs.max_num_conflicts = 0;
        let config = SeekerConfig {
            base: Some(base),
            ..SeekerConfig::default()
        };
        let err = config.validate().expect_err("out-of-range values");
        let info = err.info();
        assert!(info.context.contains_key("base.ga.mutationProbability"));
        assert!(info.context.contains_key("base.cs.maxNumConflicts"));
    }

    #[test]
    fn booleans_flatten_to_tokens() {
        let config = SeekerConfig {
            base: Some(minimal_base()),
            ..SeekerConfig::default()
        };
        let flat = config.flatten();
        assert_eq!(
            flat.get("base.cs.limitParentsToResolved"),
            Some(&ParamValue::Text("no".to_string()))
        );
        assert_eq!(
            flat.get("base.cs.cfInConflicts"),
            Some(&ParamValue::Text("yes".to_string()))
        );
    }
}
