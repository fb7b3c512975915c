//! Run configuration: TOML parsing, normalization and validation.
//!
//! A run file looks like:
//!
//! ```toml
//! [data]
//! source = "remote"        # sample | upload | remote
//! ticker = "TSLA"
//! start = "2023-01-01"
//! end = "2024-01-01"       # inclusive
//!
//! [model]
//! kind = "random_forest"   # linear_regression | decision_tree | random_forest
//! n_estimators = 100
//! max_depth = 10
//!
//! [export]
//! dir = "exports"
//! ```
//!
//! Every field is optional. Normalization trims and lowercases selectors,
//! accepts the short aliases the dashboard used (`linear`, `tree`, `forest`),
//! uppercases the ticker and fills defaults; validation then rejects
//! inconsistent settings. CLI flags are applied to the raw [`RunConfig`]
//! before normalization so they go through the same checks.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use market_data_loader::{HistoryRequest, models::request_params::DEFAULT_TICKER};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    DEFAULT_FOREST_DEPTH, DEFAULT_N_ESTIMATORS, DEFAULT_TREE_DEPTH, InvalidModelSpec, ModelSpec,
};

/// Remote range used when the run file names none.
pub const DEFAULT_START: &str = "2023-01-01";
pub const DEFAULT_END: &str = "2024-01-01";

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read run config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse run config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown data source {0:?} (expected sample, upload or remote)")]
    UnknownSource(String),

    #[error(
        "unknown model kind {0:?} (expected linear_regression, decision_tree or random_forest)"
    )]
    UnknownModel(String),

    #[error("{field} is not a valid date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("start date {start} is after end date {end}")]
    DateOrder { start: NaiveDate, end: NaiveDate },

    #[error("upload source requires data.file")]
    MissingUploadFile,

    #[error("ticker cannot be empty")]
    EmptyTicker,

    #[error("{field} does not apply to {kind}")]
    UnusedParameter {
        field: &'static str,
        kind: &'static str,
    },

    #[error(transparent)]
    Model(#[from] InvalidModelSpec),
}

/// Raw run file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RunConfig {
    pub data: DataCfg,
    pub model: ModelCfg,
    pub export: ExportCfg,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DataCfg {
    pub source: Option<String>,
    pub file: Option<PathBuf>,
    pub ticker: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ModelCfg {
    pub kind: Option<String>,
    pub n_estimators: Option<usize>,
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExportCfg {
    pub dir: Option<PathBuf>,
}

/// Where the run's prices come from, after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSetting {
    Sample,
    Upload(PathBuf),
    Remote(HistoryRequest),
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub source: SourceSetting,
    pub model: ModelSpec,
    pub export_dir: Option<PathBuf>,
}

/// What normalization changed or filled in.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Selector or ticker values rewritten by trimming, case folding or alias
    /// resolution.
    pub values_rewritten: usize,
    /// Fields that were absent and took their default.
    pub defaults_filled: usize,
    /// Remote-only fields ignored because the source is not remote.
    pub remote_fields_ignored: usize,
}

/// Resolves `cfg` into [`RunSettings`].
///
/// Errors on unknown selectors, unparsable or reversed dates, a missing
/// upload path, hyperparameters that do not belong to the chosen kind, and
/// out-of-range hyperparameters.
pub fn normalize_run_config(
    cfg: &RunConfig,
) -> Result<(RunSettings, NormalizationReport), RunConfigError> {
    let mut report = NormalizationReport::default();

    let source_name = match cfg.data.source.as_deref() {
        Some(raw) => canonical(raw, SOURCE_ALIASES, &mut report)
            .ok_or_else(|| RunConfigError::UnknownSource(raw.to_string()))?,
        None => {
            report.defaults_filled += 1;
            "sample"
        }
    };

    let source = match source_name {
        "upload" => SourceSetting::Upload(
            cfg.data
                .file
                .clone()
                .ok_or(RunConfigError::MissingUploadFile)?,
        ),
        "remote" => SourceSetting::Remote(remote_request(&cfg.data, &mut report)?),
        _ => SourceSetting::Sample,
    };
    if source_name != "remote" {
        report.remote_fields_ignored += [
            cfg.data.ticker.is_some(),
            cfg.data.start.is_some(),
            cfg.data.end.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
    }

    let model = model_spec(&cfg.model, &mut report)?;
    model.validate()?;

    Ok((
        RunSettings {
            source,
            model,
            export_dir: cfg.export.dir.clone(),
        },
        report,
    ))
}

/// Parses TOML text and normalizes it.
pub fn load_run_config_str(text: &str) -> Result<RunSettings, RunConfigError> {
    let cfg: RunConfig = toml::from_str(text)?;
    let (settings, _report) = normalize_run_config(&cfg)?;
    Ok(settings)
}

/// Reads a run file without normalizing it, so callers can layer overrides.
pub fn read_run_config(path: impl AsRef<Path>) -> Result<RunConfig, RunConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| RunConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}

const SOURCE_ALIASES: &[(&str, &str)] = &[
    ("sample", "sample"),
    ("sample_data", "sample"),
    ("upload", "upload"),
    ("file", "upload"),
    ("csv", "upload"),
    ("remote", "remote"),
    ("fetch", "remote"),
    ("yahoo", "remote"),
    ("yahoo_finance", "remote"),
];

const MODEL_ALIASES: &[(&str, &str)] = &[
    ("linear_regression", "linear_regression"),
    ("linear", "linear_regression"),
    ("decision_tree", "decision_tree"),
    ("tree", "decision_tree"),
    ("random_forest", "random_forest"),
    ("forest", "random_forest"),
];

/// Maps a user-supplied selector to its canonical name. Spaces and dashes are
/// treated as underscores.
fn canonical(
    raw: &str,
    aliases: &[(&str, &'static str)],
    report: &mut NormalizationReport,
) -> Option<&'static str> {
    let key = raw.trim().to_lowercase().replace([' ', '-'], "_");
    let (_, name) = aliases.iter().find(|(alias, _)| *alias == key)?;
    if *name != raw {
        report.values_rewritten += 1;
    }
    Some(*name)
}

fn remote_request(
    data: &DataCfg,
    report: &mut NormalizationReport,
) -> Result<HistoryRequest, RunConfigError> {
    let ticker = match data.ticker.as_deref() {
        Some(raw) => {
            let t = raw.trim().to_uppercase();
            if t.is_empty() {
                return Err(RunConfigError::EmptyTicker);
            }
            if t != raw {
                report.values_rewritten += 1;
            }
            t
        }
        None => {
            report.defaults_filled += 1;
            DEFAULT_TICKER.to_string()
        }
    };

    let start = date_field("data.start", data.start.as_deref(), DEFAULT_START, report)?;
    let end = date_field("data.end", data.end.as_deref(), DEFAULT_END, report)?;
    if start > end {
        return Err(RunConfigError::DateOrder { start, end });
    }

    Ok(HistoryRequest::new(start, end).with_ticker(ticker))
}

fn date_field(
    field: &'static str,
    value: Option<&str>,
    default: &str,
    report: &mut NormalizationReport,
) -> Result<NaiveDate, RunConfigError> {
    let raw = value.unwrap_or_else(|| {
        report.defaults_filled += 1;
        default
    });
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| RunConfigError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

fn model_spec(
    cfg: &ModelCfg,
    report: &mut NormalizationReport,
) -> Result<ModelSpec, RunConfigError> {
    let kind = match cfg.kind.as_deref() {
        Some(raw) => canonical(raw, MODEL_ALIASES, report)
            .ok_or_else(|| RunConfigError::UnknownModel(raw.to_string()))?,
        None => {
            report.defaults_filled += 1;
            "linear_regression"
        }
    };

    let mut fill = |value: Option<usize>, default: usize| {
        value.unwrap_or_else(|| {
            report.defaults_filled += 1;
            default
        })
    };

    match kind {
        "decision_tree" => {
            if cfg.n_estimators.is_some() {
                return Err(RunConfigError::UnusedParameter {
                    field: "n_estimators",
                    kind,
                });
            }
            Ok(ModelSpec::DecisionTree {
                max_depth: fill(cfg.max_depth, DEFAULT_TREE_DEPTH),
            })
        }
        "random_forest" => Ok(ModelSpec::RandomForest {
            n_estimators: fill(cfg.n_estimators, DEFAULT_N_ESTIMATORS),
            max_depth: fill(cfg.max_depth, DEFAULT_FOREST_DEPTH),
        }),
        _ => {
            let params = [
                ("n_estimators", cfg.n_estimators),
                ("max_depth", cfg.max_depth),
            ];
            for (field, value) in params {
                if value.is_some() {
                    return Err(RunConfigError::UnusedParameter { field, kind });
                }
            }
            Ok(ModelSpec::Linear)
        }
    }
}
