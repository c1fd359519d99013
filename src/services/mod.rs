// Service exports
pub mod fallback;
pub mod postgres;
pub mod recommendation;
pub mod source;
pub mod supabase;

pub use fallback::StaticCitySource;
pub use postgres::PostgresCitySource;
pub use recommendation::{RecommendationService, RecommendationSession};
pub use source::{build_city_source, CitySource, FallbackCitySource, SourceError};
pub use supabase::SupabaseCitySource;
