// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod rows;

pub use domain::{CustomerProfile, CityDemographic, CityFilters, CityPool, PoolOrigin, ScoringRubric};
pub use requests::{RecommendationRequest, CitiesQuery, SearchQuery};
pub use responses::{RecommendationResponse, CitiesResponse, HealthResponse, ErrorResponse};
pub use rows::{CityRow, DemographicRow, CityWithDemographics};
