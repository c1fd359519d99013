//! City data sources
//!
//! A [`CitySource`] supplies the pool of cities the recommender ranks.
//! Remote sources (Supabase REST, direct Postgres) may fail; wrapping them in
//! a [`FallbackCitySource`] bounds their latency and substitutes the embedded
//! dataset on any failure, so callers always get a pool back.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::SourceSettings;
use crate::models::{CityFilters, CityPool};
use crate::services::fallback::StaticCitySource;
use crate::services::postgres::PostgresCitySource;
use crate::services::supabase::SupabaseCitySource;

/// Errors that can occur when fetching cities from a source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Source timed out after {0:?}")]
    Timeout(Duration),

    #[error("Source not configured: {0}")]
    NotConfigured(String),
}

/// A supplier of city records
#[async_trait]
pub trait CitySource: Send + Sync {
    /// Short name used in logs and health output
    fn name(&self) -> &'static str;

    /// Fetch cities, applying `filters` at the source when supported
    async fn fetch_cities(&self, filters: &CityFilters) -> Result<CityPool, SourceError>;

    /// Cheap connectivity probe
    async fn health_check(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Races a primary source against a timeout, falling back to static data
///
/// Never returns `Err` from `fetch_cities`: failures and timeouts are logged
/// and answered with the filtered embedded dataset, tagged
/// [`PoolOrigin::Fallback`](crate::models::PoolOrigin::Fallback).
pub struct FallbackCitySource {
    primary: Arc<dyn CitySource>,
    fallback: StaticCitySource,
    timeout: Duration,
}

impl FallbackCitySource {
    pub fn new(primary: Arc<dyn CitySource>, fallback: StaticCitySource, timeout: Duration) -> Self {
        Self { primary, fallback, timeout }
    }
}

#[async_trait]
impl CitySource for FallbackCitySource {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn fetch_cities(&self, filters: &CityFilters) -> Result<CityPool, SourceError> {
        let outcome = tokio::time::timeout(self.timeout, self.primary.fetch_cities(filters)).await;

        let err = match outcome {
            Ok(Ok(pool)) => {
                tracing::debug!("{} returned {} cities", self.primary.name(), pool.cities.len());
                return Ok(pool);
            }
            Ok(Err(e)) => e,
            Err(_) => SourceError::Timeout(self.timeout),
        };

        tracing::warn!(
            "City source {} unavailable, serving fallback dataset: {}",
            self.primary.name(),
            err
        );

        Ok(CityPool::fallback(self.fallback.filtered(filters)))
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        match tokio::time::timeout(self.timeout, self.primary.health_check()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.timeout)),
        }
    }
}

/// Build the city source described by `settings`
///
/// Supabase is preferred when both its URL and key are set, then a direct
/// Postgres connection. Remote sources are wrapped in a
/// [`FallbackCitySource`]. If nothing is configured, or the remote source
/// cannot be constructed, the embedded dataset is served on its own.
pub async fn build_city_source(settings: &SourceSettings) -> Arc<dyn CitySource> {
    let timeout = settings.timeout();

    let primary: Result<Arc<dyn CitySource>, SourceError> =
        match (&settings.supabase_url, &settings.supabase_key, &settings.database_url) {
            (Some(url), Some(key), _) => SupabaseCitySource::new(url.clone(), key.clone(), timeout)
                .map(|source| Arc::new(source) as Arc<dyn CitySource>),
            (_, _, Some(database_url)) => PostgresCitySource::connect(
                database_url,
                settings.max_connections.unwrap_or(10),
                settings.min_connections.unwrap_or(1),
            )
            .await
            .map(|source| Arc::new(source) as Arc<dyn CitySource>),
            _ => Err(SourceError::NotConfigured(
                "no supabase_url/supabase_key or database_url set".to_string(),
            )),
        };

    match primary {
        Ok(primary) => {
            tracing::info!(
                "Using {} city source (timeout: {}s)",
                primary.name(),
                timeout.as_secs()
            );
            Arc::new(FallbackCitySource::new(primary, StaticCitySource::embedded(), timeout))
        }
        Err(SourceError::NotConfigured(reason)) => {
            tracing::info!("No live city source configured ({}), serving embedded dataset", reason);
            Arc::new(StaticCitySource::embedded())
        }
        Err(e) => {
            tracing::error!("Failed to initialize city source ({}), serving embedded dataset", e);
            Arc::new(StaticCitySource::embedded())
        }
    }
}
