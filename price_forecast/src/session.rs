//! Session context: one loader, the last successful result, and the run
//! pipeline that replaces it.

use std::sync::Arc;

use market_data_loader::{DataLoader, DataSource, PricePoint};
use tracing::{Instrument, info, info_span, warn};

use crate::{
    errors::PipelineError,
    features::{FeatureRow, build_features},
    metrics::EvaluationResult,
    model::{ModelSpec, TrainedModel},
    signal::{DataPreview, MovementSummary, Signal},
    trainer::train,
};

/// Raw price rows a run needs before features are built.
pub const MIN_RAW_ROWS: usize = 100;

/// What to load and what to train.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source: DataSource,
    pub model: ModelSpec,
}

/// Everything produced by one successful run.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub source: String,
    pub series: Arc<[PricePoint]>,
    pub features: Vec<FeatureRow>,
    pub model: TrainedModel,
    pub evaluation: EvaluationResult,
    /// Feature-table index of each test prediction.
    pub test_rows: Vec<usize>,
    pub n_train: usize,
    pub signal: Option<Signal>,
    pub movement: MovementSummary,
    pub preview: DataPreview,
}

/// Holds the loader cache and the latest successful [`SessionState`].
///
/// A run builds a fresh state and only swaps it in once every stage has
/// succeeded, so a failed run leaves the previous result in place.
pub struct Session {
    loader: DataLoader,
    current: Option<Arc<SessionState>>,
}

impl Session {
    pub fn new(loader: DataLoader) -> Self {
        Self {
            loader,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Arc<SessionState>> {
        self.current.as_ref()
    }

    pub async fn run(&mut self, request: &RunRequest) -> Result<Arc<SessionState>, PipelineError> {
        let span = info_span!(
            "run",
            source = %request.source.describe(),
            model = request.model.slug()
        );
        match self.execute(request).instrument(span).await {
            Ok(state) => {
                let state = Arc::new(state);
                self.current = Some(Arc::clone(&state));
                Ok(state)
            }
            Err(err) => {
                warn!(error = %err, kept_previous = self.current.is_some(), "run failed");
                Err(err)
            }
        }
    }

    async fn execute(&mut self, request: &RunRequest) -> Result<SessionState, PipelineError> {
        request.model.validate()?;

        let series = self.loader.load(&request.source).await?;
        if series.len() < MIN_RAW_ROWS {
            return Err(PipelineError::InsufficientData {
                required: MIN_RAW_ROWS,
                actual: series.len(),
            });
        }

        let features = build_features(&series);
        info!(raw = series.len(), features = features.len(), "features built");

        let outcome = train(&features, request.model)?;
        let signal = Signal::from_run(
            &outcome.evaluation.predictions,
            &series,
            outcome.evaluation.r2,
        );

        Ok(SessionState {
            source: request.source.describe(),
            movement: MovementSummary::from_series(&series),
            preview: DataPreview::from_series(&series),
            series,
            features,
            model: outcome.model,
            evaluation: outcome.evaluation,
            test_rows: outcome.test_rows,
            n_train: outcome.n_train,
            signal,
        })
    }

    /// Drops the current result and every cached series.
    pub fn reset(&mut self) {
        self.current = None;
        self.loader.clear_cache();
    }
}
