//! The three places a price series can come from.

pub mod sample;
pub mod upload;

use crate::{
    cache::SourceKey,
    models::request_params::HistoryRequest,
    sources::upload::UploadedFile,
};

/// A source selector together with its parameters.
#[derive(Clone, Debug)]
pub enum DataSource {
    /// Deterministic synthetic series.
    Sample,
    /// A user-supplied delimited table.
    Upload(UploadedFile),
    /// Daily history fetched through the configured provider.
    Remote(HistoryRequest),
}

impl DataSource {
    /// Cache key identifying this source's content.
    pub fn key(&self) -> SourceKey {
        match self {
            DataSource::Sample => SourceKey::Sample,
            DataSource::Upload(file) => SourceKey::Upload {
                digest: file.digest(),
                len: file.contents.len(),
            },
            DataSource::Remote(req) => SourceKey::Remote {
                ticker: req.ticker.trim().to_ascii_uppercase(),
                start: req.start,
                end: req.end,
            },
        }
    }

    /// Short human label used in logs and reports.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Sample => "sample data".to_string(),
            DataSource::Upload(file) => format!("upload {}", file.name),
            DataSource::Remote(req) => {
                format!("{} {}..={}", req.ticker, req.start, req.end)
            }
        }
    }
}
