use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::core::filters::matches_filters;
use crate::models::{CityDemographic, CityFilters, CityPool, CityWithDemographics};
use crate::services::source::{CitySource, SourceError};

const CITY_COLUMNS: &str = "id,name,country,nuts_code,latitude,longitude";

/// Supabase (PostgREST) city source
///
/// Queries `cities` with an inner-joined `demographic_data` embed, pushing
/// the country and income filters down into the query string.
pub struct SupabaseCitySource {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SupabaseCitySource {
    /// Create a new Supabase source
    ///
    /// `timeout` bounds each HTTP request; the fallback wrapper applies its
    /// own timeout on top of this.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, SourceError> {
        if base_url.trim().is_empty() || api_key.trim().is_empty() {
            return Err(SourceError::NotConfigured("supabase url or key is empty".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    /// Build the PostgREST query string for a city fetch
    fn build_query(filters: &CityFilters) -> String {
        let select = format!("{},demographic_data!inner(*)", CITY_COLUMNS);
        let mut params = vec![format!("select={}", urlencoding::encode(&select))];

        if let Some(country) = &filters.country {
            params.push(format!("country=ilike.{}", urlencoding::encode(country.trim())));
        }
        if let Some(min_income) = filters.min_income {
            params.push(format!("demographic_data.average_income=gte.{}", min_income));
        }
        if let Some(max_income) = filters.max_income {
            params.push(format!("demographic_data.average_income=lte.{}", max_income));
        }
        params.push("order=name.asc".to_string());

        params.join("&")
    }
}

#[async_trait]
impl CitySource for SupabaseCitySource {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn fetch_cities(&self, filters: &CityFilters) -> Result<CityPool, SourceError> {
        let url = format!("{}?{}", self.table_url("cities"), Self::build_query(filters));

        tracing::debug!("Fetching cities from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(SourceError::ApiError(format!(
                "Failed to fetch cities: {} - {}",
                status, body
            )));
        }

        let records: Vec<CityWithDemographics> = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(format!("Failed to parse cities: {}", e)))?;

        let total = records.len();
        let cities: Vec<CityDemographic> = records
            .iter()
            .filter_map(|record| {
                let demo = record.demographic_data.first()?;
                match CityDemographic::from_rows(&record.city, demo) {
                    Ok(city) => Some(city),
                    Err(e) => {
                        tracing::warn!("Skipping city {}: {}", record.city.name, e);
                        None
                    }
                }
            })
            // PostgREST already filtered; re-check in case an embed filter was ignored
            .filter(|city| matches_filters(city, filters))
            .collect();

        tracing::debug!("Composed {} cities (rows: {})", cities.len(), total);

        Ok(CityPool::live(cities))
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        let url = format!("{}?select=id&limit=1", self.table_url("cities"));

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )));
        }

        Ok(())
    }
}
