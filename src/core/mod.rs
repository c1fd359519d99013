// Core algorithm exports
pub mod derive;
pub mod filters;
pub mod profile;
pub mod recommender;
pub mod scoring;
pub mod session;

pub use derive::{estimate_median_age, categorize_education, categorize_industry, RowError};
pub use filters::{in_range, matches_filters, matching_industries, matches_search};
pub use profile::{parse_u32_or_default, parse_f64_or_default, toggle, ProfileForm};
pub use recommender::{Recommender, MAX_RECOMMENDATIONS, DEGRADED_REASON};
pub use scoring::calculate_match_score;
pub use session::{Generation, GenerationGuard};
