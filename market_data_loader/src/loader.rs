//! Single entry point for getting a price series from any [`DataSource`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    cache::LoaderCache,
    errors::LoadError,
    models::price_point::PricePoint,
    providers::{
        DataProvider, ProviderInitError,
        yahoo_rest::{YahooConfig, YahooProvider},
    },
    sources::{DataSource, sample::generate_sample_series},
};

/// Loads series from the sample generator, uploads, or a remote provider,
/// memoising each successful result by its [`SourceKey`](crate::cache::SourceKey).
pub struct DataLoader {
    provider: Box<dyn DataProvider + Send + Sync>,
    cache: LoaderCache,
}

impl DataLoader {
    pub fn new(provider: Box<dyn DataProvider + Send + Sync>) -> Self {
        Self::with_cache(provider, LoaderCache::default())
    }

    pub fn with_cache(provider: Box<dyn DataProvider + Send + Sync>, cache: LoaderCache) -> Self {
        Self { provider, cache }
    }

    /// Loader backed by the Yahoo chart API, configured from the environment.
    pub fn with_default_provider() -> Result<Self, ProviderInitError> {
        let provider = YahooProvider::new(YahooConfig::from_env()?)?;
        Ok(Self::new(Box::new(provider)))
    }

    /// Returns the series for `source`, ascending by date.
    ///
    /// A cached series is returned as is; the provider is only contacted on a
    /// miss. Errors leave the cache untouched.
    pub async fn load(&mut self, source: &DataSource) -> Result<Arc<[PricePoint]>, LoadError> {
        let key = source.key();
        if let Some(hit) = self.cache.get(&key) {
            debug!(source = %source.describe(), rows = hit.len(), "cache hit");
            return Ok(hit);
        }

        let points = match source {
            DataSource::Sample => generate_sample_series(),
            DataSource::Upload(file) => file.parse()?,
            DataSource::Remote(request) => self.provider.fetch_daily_history(request).await?,
        };
        info!(source = %source.describe(), rows = points.len(), "series loaded");

        let series: Arc<[PricePoint]> = Arc::from(points);
        self.cache.insert(key, Arc::clone(&series));
        Ok(series)
    }

    pub fn cache(&self) -> &LoaderCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
