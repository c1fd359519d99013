use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

use crate::core::filters::matches_filters;
use crate::models::{CityDemographic, CityFilters, CityPool};
use crate::services::source::{CitySource, SourceError};

/// Known cities with precomputed demographics, compiled into the binary
const EMBEDDED_DATASET: &str = include_str!("../../data/fallback_cities.toml");

#[derive(Debug, Deserialize)]
struct FallbackDataset {
    cities: Vec<CityDemographic>,
}

/// Parse the embedded dataset once
///
/// A malformed dataset is logged and treated as empty rather than panicking;
/// the unit tests guarantee the shipped file parses.
fn embedded_cities() -> Arc<Vec<CityDemographic>> {
    static DATASET: OnceLock<Arc<Vec<CityDemographic>>> = OnceLock::new();

    DATASET
        .get_or_init(|| match toml::from_str::<FallbackDataset>(EMBEDDED_DATASET) {
            Ok(dataset) => {
                let cities = dataset
                    .cities
                    .into_iter()
                    .map(|city| CityDemographic { match_score: None, reasons: Vec::new(), ..city })
                    .collect();
                Arc::new(cities)
            }
            Err(e) => {
                tracing::error!("Embedded fallback dataset is invalid: {}", e);
                Arc::new(Vec::new())
            }
        })
        .clone()
}

/// City source backed by a fixed in-memory dataset
///
/// Never fails. Filters are applied locally.
#[derive(Debug, Clone)]
pub struct StaticCitySource {
    cities: Arc<Vec<CityDemographic>>,
}

impl StaticCitySource {
    /// Source over the dataset shipped with the crate
    pub fn embedded() -> Self {
        Self { cities: embedded_cities() }
    }

    /// Source over an arbitrary set of cities
    pub fn new(cities: Vec<CityDemographic>) -> Self {
        Self { cities: Arc::new(cities) }
    }

    pub fn cities(&self) -> &[CityDemographic] {
        &self.cities
    }

    /// Cities passing `filters`, in dataset order
    pub fn filtered(&self, filters: &CityFilters) -> Vec<CityDemographic> {
        self.cities
            .iter()
            .filter(|city| matches_filters(city, filters))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CitySource for StaticCitySource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_cities(&self, filters: &CityFilters) -> Result<CityPool, SourceError> {
        Ok(CityPool::from_static(self.filtered(filters)))
    }
}
