use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use market_data_loader::{DataLoader, DataSource, UploadedFile};
use price_forecast::{
    RunRequest, Session,
    config::{RunConfig, SourceSetting, normalize_run_config, read_run_config},
    export::export_run,
    report::render_report,
};
use shared_utils::env::get_env_var_opt;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable naming a run file when `--config` is absent.
const CONFIG_ENV: &str = "PRICE_FORECAST_CONFIG";

#[derive(Parser)]
#[command(version, about = "Train a next-day close forecaster and print a trading signal")]
struct Cli {
    /// TOML run file; flags below override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// sample, upload or remote
    #[arg(long)]
    source: Option<String>,

    /// Price table for the upload source.
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    #[arg(long)]
    ticker: Option<String>,

    /// First day to fetch (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// Last day to fetch, inclusive (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,

    /// linear_regression, decision_tree or random_forest
    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    n_estimators: Option<usize>,

    #[arg(long)]
    max_depth: Option<usize>,

    /// Write prediction and feature CSVs into this directory.
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,
}

impl Cli {
    fn apply_overrides(self, cfg: &mut RunConfig) {
        let data = &mut cfg.data;
        data.source = self.source.or(data.source.take());
        data.file = self.file.or(data.file.take());
        data.ticker = self.ticker.or(data.ticker.take());
        data.start = self.start.or(data.start.take());
        data.end = self.end.or(data.end.take());

        let model = &mut cfg.model;
        model.kind = self.model.or(model.kind.take());
        model.n_estimators = self.n_estimators.or(model.n_estimators);
        model.max_depth = self.max_depth.or(model.max_depth);

        cfg.export.dir = self.export_dir.or(cfg.export.dir.take());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| get_env_var_opt(CONFIG_ENV).map(PathBuf::from));
    let mut cfg = match &config_path {
        Some(path) => read_run_config(path)?,
        None => RunConfig::default(),
    };
    cli.apply_overrides(&mut cfg);

    let (settings, report) = normalize_run_config(&cfg).context("invalid run configuration")?;
    debug!(?report, "run configuration normalized");

    let source = match settings.source {
        SourceSetting::Sample => DataSource::Sample,
        SourceSetting::Upload(path) => DataSource::Upload(
            UploadedFile::from_path(&path)
                .with_context(|| format!("read upload {}", path.display()))?,
        ),
        SourceSetting::Remote(request) => DataSource::Remote(request),
    };

    let loader = DataLoader::with_default_provider().context("failed to set up data provider")?;
    let mut session = Session::new(loader);
    let state = session
        .run(&RunRequest {
            source,
            model: settings.model,
        })
        .await?;

    print!("{}", render_report(&state));

    if let Some(dir) = settings.export_dir {
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let paths = export_run(&dir, &state.model.spec, &state.evaluation, &state.features)
            .with_context(|| format!("export into {}", dir.display()))?;
        info!(
            predictions = %paths.predictions.display(),
            features = %paths.features.display(),
            "exports written"
        );
    }

    Ok(())
}
