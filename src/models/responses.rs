use serde::{Deserialize, Serialize};
use crate::models::domain::CityDemographic;

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<CityDemographic>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Response for city listing and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitiesResponse {
    pub cities: Vec<CityDemographic>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub source: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
