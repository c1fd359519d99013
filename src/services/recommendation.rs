use std::sync::Arc;

use crate::core::filters::matches_search;
use crate::core::{GenerationGuard, Recommender};
use crate::models::{CityDemographic, CityFilters, CustomerProfile, PoolOrigin};
use crate::services::fallback::StaticCitySource;
use crate::services::source::CitySource;

/// Recommendation facade used by the HTTP layer
///
/// Holds an injected city source and recommender. None of its operations
/// fail: source errors are answered from the fallback dataset.
pub struct RecommendationService {
    source: Arc<dyn CitySource>,
    fallback: StaticCitySource,
    recommender: Recommender,
}

impl RecommendationService {
    pub fn new(source: Arc<dyn CitySource>, recommender: Recommender) -> Self {
        Self {
            source,
            fallback: StaticCitySource::embedded(),
            recommender,
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn source(&self) -> &Arc<dyn CitySource> {
        &self.source
    }

    /// Top ten cities for a profile
    ///
    /// Live and static pools are scored with the rubric. When the source had
    /// to fall back, or failed outright, the fallback cities are returned
    /// with placeholder scores in 60-100 instead.
    pub async fn get_city_recommendations(&self, profile: &CustomerProfile) -> Vec<CityDemographic> {
        let pool = match self.source.fetch_cities(&CityFilters::none()).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!("City source {} failed, using degraded recommendations: {}", self.source.name(), e);
                return self.degraded(self.fallback.cities());
            }
        };

        match pool.origin {
            PoolOrigin::Live | PoolOrigin::Static => {
                let recommendations = self.recommender.recommend(profile, &pool.cities);
                tracing::debug!(
                    "Ranked {} of {} cities ({:?})",
                    recommendations.len(),
                    pool.cities.len(),
                    pool.origin
                );
                recommendations
            }
            PoolOrigin::Fallback => {
                tracing::info!("Serving degraded recommendations from {} fallback cities", pool.cities.len());
                self.degraded(&pool.cities)
            }
        }
    }

    /// Cities with demographics, optionally filtered by country and income
    pub async fn get_cities_with_demographics(
        &self,
        country: Option<String>,
        min_income: Option<f64>,
        max_income: Option<f64>,
    ) -> Vec<CityDemographic> {
        let filters = CityFilters { country, min_income, max_income };
        self.fetch_or_fallback(&filters).await
    }

    /// Case-insensitive search over name, country and industry focus
    pub async fn search_cities(&self, query: &str) -> Vec<CityDemographic> {
        self.fetch_or_fallback(&CityFilters::none())
            .await
            .into_iter()
            .filter(|city| matches_search(city, query))
            .collect()
    }

    async fn fetch_or_fallback(&self, filters: &CityFilters) -> Vec<CityDemographic> {
        match self.source.fetch_cities(filters).await {
            Ok(pool) => pool.cities,
            Err(e) => {
                tracing::warn!("City source {} failed, using fallback dataset: {}", self.source.name(), e);
                self.fallback.filtered(filters)
            }
        }
    }

    fn degraded(&self, cities: &[CityDemographic]) -> Vec<CityDemographic> {
        let mut rng = rand::thread_rng();
        self.recommender.degraded(cities, &mut rng)
    }
}

/// Recommendation requests for one client, latest wins
///
/// Each [`submit`](Self::submit) takes a new generation ticket. If another
/// submit started while this one was waiting on the data source, the older
/// result is dropped instead of overwriting the newer one.
pub struct RecommendationSession {
    service: Arc<RecommendationService>,
    guard: GenerationGuard<Vec<CityDemographic>>,
}

impl RecommendationSession {
    pub fn new(service: Arc<RecommendationService>) -> Self {
        Self {
            service,
            guard: GenerationGuard::new(),
        }
    }

    /// Run a recommendation; `None` if a newer submit superseded it
    pub async fn submit(&self, profile: &CustomerProfile) -> Option<Vec<CityDemographic>> {
        let generation = self.guard.begin();
        let recommendations = self.service.get_city_recommendations(profile).await;

        if self.guard.publish(generation, recommendations.clone()).await {
            Some(recommendations)
        } else {
            tracing::debug!("Discarding stale recommendations (generation {})", generation.value());
            None
        }
    }

    /// Most recent result that was not superseded
    pub async fn latest(&self) -> Option<Vec<CityDemographic>> {
        self.guard.latest().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CityPool;
    use crate::services::source::SourceError;
    use async_trait::async_trait;

    struct BrokenSource;

    #[async_trait]
    impl CitySource for BrokenSource {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn fetch_cities(&self, _filters: &CityFilters) -> Result<CityPool, SourceError> {
            Err(SourceError::NotConfigured("missing url".to_string()))
        }
    }

    fn service_over(source: Arc<dyn CitySource>) -> RecommendationService {
        RecommendationService::new(source, Recommender::default())
    }

    #[tokio::test]
    async fn test_static_source_uses_rubric() {
        let service = service_over(Arc::new(StaticCitySource::embedded()));
        let profile = CustomerProfile {
            age_range: (25.0, 45.0),
            income_range: (30_000.0, 60_000.0),
            education_levels: ["University".to_string()].into_iter().collect(),
            interests: ["Technology".to_string()].into_iter().collect(),
            location_preferences: ["Spain".to_string()].into_iter().collect(),
        };

        let result = service.get_city_recommendations(&profile).await;

        assert!(!result.is_empty());
        assert_eq!(result[0].match_score, Some(100.0));
        assert_eq!(result[0].reasons.len(), 5);
    }

    #[tokio::test]
    async fn test_source_error_degrades() {
        let service = service_over(Arc::new(BrokenSource));

        let result = service.get_city_recommendations(&CustomerProfile::default()).await;

        assert!(!result.is_empty());
        assert!(result.iter().all(|c| (60.0..=100.0).contains(&c.score())));
    }

    #[tokio::test]
    async fn test_cities_fall_back_with_filters() {
        let service = service_over(Arc::new(BrokenSource));

        let cities = service
            .get_cities_with_demographics(Some("Germany".to_string()), None, None)
            .await;

        assert!(!cities.is_empty());
        assert!(cities.iter().all(|c| c.country == "Germany"));
        assert!(cities.iter().all(|c| c.match_score.is_none()));
    }

    #[tokio::test]
    async fn test_search_cities() {
        let service = service_over(Arc::new(StaticCitySource::embedded()));

        let by_name = service.search_cities("mad").await;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Madrid");

        let by_industry = service.search_cities("AUTOMOTIVE").await;
        assert!(by_industry.iter().any(|c| c.name == "Munich"));

        let everything = service.search_cities("  ").await;
        assert_eq!(everything.len(), StaticCitySource::embedded().cities().len());
    }
}
