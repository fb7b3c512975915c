//! Split, fit and evaluate.

use tracing::{debug, info, info_span};

use crate::{
    dataset::{DEFAULT_SEED, Dataset},
    errors::{PipelineError, TrainingError},
    features::FeatureRow,
    metrics::EvaluationResult,
    model::{ModelSpec, TrainedModel},
};

/// Fewest feature rows that still leave a non-empty training partition.
pub const MIN_FEATURE_ROWS: usize = 2;

/// Output of one training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub evaluation: EvaluationResult,
    /// Index into the feature table of each test prediction, in test order.
    pub test_rows: Vec<usize>,
    pub n_train: usize,
}

/// Trains `spec` on `rows` with the seeded 80/20 split and scores it on the
/// held-out rows.
pub fn train(rows: &[FeatureRow], spec: ModelSpec) -> Result<TrainingOutcome, PipelineError> {
    spec.validate()?;
    let _span = info_span!("train", model = spec.slug(), rows = rows.len()).entered();

    if rows.len() < MIN_FEATURE_ROWS {
        return Err(TrainingError::NotEnoughRows {
            required: MIN_FEATURE_ROWS,
            actual: rows.len(),
        }
        .into());
    }

    let split = Dataset::from_rows(rows).random_split(DEFAULT_SEED);
    debug!(
        train = split.train.n_samples(),
        test = split.test.n_samples(),
        "split feature rows"
    );

    let model = TrainedModel::fit(spec, &split.train)?;
    let predictions = model.predict(&split.test.features)?;
    let evaluation = EvaluationResult::new(split.test.targets, predictions);

    info!(
        mse = evaluation.mse,
        rmse = evaluation.rmse,
        r2 = evaluation.r2,
        "model evaluated"
    );

    Ok(TrainingOutcome {
        model,
        evaluation,
        test_rows: split.test_rows,
        n_train: split.train.n_samples(),
    })
}
