//! Delimited-text exports of a run.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::Writer;
use serde::Serialize;

use crate::{features::FeatureRow, metrics::EvaluationResult, model::ModelSpec};

/// Ticker prefix used in exported file names.
pub const EXPORT_PREFIX: &str = "tsla";

#[derive(Serialize)]
struct PredictionRecord {
    #[serde(rename = "Actual")]
    actual: f64,
    #[serde(rename = "Predicted")]
    predicted: f64,
    #[serde(rename = "Error")]
    error: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FeatureRecord {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(rename = "MA_5")]
    ma_5: f64,
    #[serde(rename = "MA_20")]
    ma_20: f64,
    #[serde(rename = "MA_50")]
    ma_50: f64,
    #[serde(rename = "Price_Change")]
    price_change: f64,
    #[serde(rename = "High_Low_Pct")]
    high_low_pct: f64,
    #[serde(rename = "Volume_MA")]
    volume_ma: f64,
    #[serde(rename = "Close_Lag_1")]
    close_lag_1: f64,
    #[serde(rename = "Close_Lag_2")]
    close_lag_2: f64,
    #[serde(rename = "Close_Lag_3")]
    close_lag_3: f64,
    #[serde(rename = "Close_Lag_5")]
    close_lag_5: f64,
    target: f64,
}

impl From<&FeatureRow> for FeatureRecord {
    fn from(r: &FeatureRow) -> Self {
        Self {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
            ma_5: r.ma_5,
            ma_20: r.ma_20,
            ma_50: r.ma_50,
            price_change: r.price_change,
            high_low_pct: r.high_low_pct,
            volume_ma: r.volume_ma,
            close_lag_1: r.close_lag_1,
            close_lag_2: r.close_lag_2,
            close_lag_3: r.close_lag_3,
            close_lag_5: r.close_lag_5,
            target: r.target,
        }
    }
}

/// `tsla_predictions_<model>.csv`
pub fn predictions_file_name(spec: &ModelSpec) -> String {
    format!("{EXPORT_PREFIX}_predictions_{}.csv", spec.slug())
}

/// `tsla_dataset_with_features.csv`
pub fn features_file_name() -> String {
    format!("{EXPORT_PREFIX}_dataset_with_features.csv")
}

/// Writes `Actual,Predicted,Error` for each test row, in test order.
pub fn write_predictions<W: Write>(writer: W, eval: &EvaluationResult) -> csv::Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for ((&actual, &predicted), error) in eval
        .actuals
        .iter()
        .zip(&eval.predictions)
        .zip(eval.errors())
    {
        wtr.serialize(PredictionRecord {
            actual,
            predicted,
            error,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the full feature table with a header row.
pub fn write_features<W: Write>(writer: W, rows: &[FeatureRow]) -> csv::Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(FeatureRecord::from(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Paths of the files written by [`export_run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub predictions: PathBuf,
    pub features: PathBuf,
}

/// Writes both exports into `dir`, which must exist.
pub fn export_run(
    dir: &Path,
    spec: &ModelSpec,
    eval: &EvaluationResult,
    rows: &[FeatureRow],
) -> csv::Result<ExportPaths> {
    let paths = ExportPaths {
        predictions: dir.join(predictions_file_name(spec)),
        features: dir.join(features_file_name()),
    };
    write_predictions(File::create(&paths.predictions)?, eval)?;
    write_features(File::create(&paths.features)?, rows)?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_export_has_header_and_error_column() {
        let eval = EvaluationResult::new(vec![10.0, 5.0], vec![8.0, 6.5]);
        let mut buf = Vec::new();
        write_predictions(&mut buf, &eval).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Actual,Predicted,Error\n10.0,8.0,2.0\n5.0,6.5,-1.5\n");
    }

    #[test]
    fn feature_export_header_matches_column_names() {
        let row = FeatureRow {
            date: NaiveDate::from_ymd_opt(2023, 3, 14).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 100.0,
            ma_5: 1.0,
            ma_20: 1.0,
            ma_50: 1.0,
            price_change: 0.1,
            high_low_pct: 1.0,
            volume_ma: 90.0,
            close_lag_1: 1.4,
            close_lag_2: 1.3,
            close_lag_3: 1.2,
            close_lag_5: 1.0,
            target: 1.6,
        };
        let mut buf = Vec::new();
        write_features(&mut buf, &[row]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Open,High,Low,Close,Volume,MA_5,MA_20,MA_50,Price_Change,High_Low_Pct,\
             Volume_MA,Close_Lag_1,Close_Lag_2,Close_Lag_3,Close_Lag_5,Target"
        );
        assert!(lines.next().unwrap().starts_with("2023-03-14,1.0,2.0,0.5,1.5,100.0,"));
    }

    #[test]
    fn file_names_follow_model_kind() {
        assert_eq!(
            predictions_file_name(&ModelSpec::random_forest()),
            "tsla_predictions_random_forest.csv"
        );
        assert_eq!(features_file_name(), "tsla_dataset_with_features.csv");
    }
}
