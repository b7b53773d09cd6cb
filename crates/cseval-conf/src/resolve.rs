use std::fs;
use std::path::Path;

use cseval_core::{ErrorInfo, EvalError};
use toml::map::Entry;

use crate::params::ResolvedConfig;
use crate::seeker::{Feature, SeekerConfig};

const INCLUDE_KEY: &str = "include";

/// Loads a seeker configuration: parses the document, deep-merges an optional
/// shared include, applies the `enabled_features` allow-list, and validates
/// the result.
pub fn load_seeker_config(path: &Path) -> Result<SeekerConfig, EvalError> {
    let mut raw = read_table(path)?;
    if let Some(value) = raw.remove(INCLUDE_KEY) {
        let include = value.as_str().ok_or_else(|| {
            EvalError::Serde(
                ErrorInfo::new("conf.include", "include reference must be a string")
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let base_path = path.parent().unwrap_or_else(|| Path::new(".")).join(include);
        let base = read_table(&base_path)?;
        raw = merge_tables(base, raw);
    }
    let mut config: SeekerConfig =
        toml::Value::Table(raw)
            .try_into()
            .map_err(|err: toml::de::Error| {
                EvalError::Serde(
                    ErrorInfo::new("conf.decode", "failed to decode seeker configuration")
                        .with_context("path", path.display().to_string())
                        .with_hint(err.to_string()),
                )
            })?;
    apply_feature_filter(&mut config);
    config.validate()?;
    Ok(config)
}

/// Resolves a configuration file into the flat parameter set fed to the
/// seeker. Resolution is deterministic: the same input yields byte-identical
/// flattened output, including key order.
pub fn resolve_config(path: &Path) -> Result<ResolvedConfig, EvalError> {
    Ok(load_seeker_config(path)?.flatten())
}

pub(crate) fn read_table(path: &Path) -> Result<toml::Table, EvalError> {
    let text = fs::read_to_string(path).map_err(|err| {
        EvalError::MissingFile(
            ErrorInfo::new("conf.read", "failed to read configuration file")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    text.parse::<toml::Table>().map_err(|err| {
        EvalError::Serde(
            ErrorInfo::new("conf.parse", "failed to parse TOML document")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}

/// Merges the overlay over the base: top-level tables extend key-by-key (one
/// level deep, sub-keys overwrite wholesale), every other value overwrites.
/// Keys absent from the overlay keep the base's values.
fn merge_tables(base: toml::Table, overlay: toml::Table) -> toml::Table {
    let mut merged = base;
    for (key, value) in overlay {
        match merged.entry(key) {
            Entry::Occupied(mut slot) => match (slot.get_mut(), value) {
                (toml::Value::Table(existing), toml::Value::Table(incoming)) => {
                    for (sub_key, sub_value) in incoming {
                        existing.insert(sub_key, sub_value);
                    }
                }
                (slot_value, value) => *slot_value = value,
            },
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }
    merged
}

/// Removes recognized feature blocks missing from the allow-list. Disabling
/// drops the whole typed block, so its defaults cannot resurface downstream.
fn apply_feature_filter(config: &mut SeekerConfig) {
    let Some(enabled) = config.enabled_features.clone() else {
        return;
    };
    if !enabled.contains(&Feature::Base) {
        config.base = None;
    }
    if !enabled.contains(&Feature::Extinction) {
        config.extinction = None;
    }
    if !enabled.contains(&Feature::Weighting) {
        config.weighting = None;
    }
}
