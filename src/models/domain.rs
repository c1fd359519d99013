use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Target customer profile used to rank cities
///
/// Ranges are `(min, max)` pairs. They are not validated here: an inverted
/// range is carried through and simply never matches during scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(rename = "ageRange")]
    pub age_range: (f64, f64),
    #[serde(rename = "incomeRange")]
    pub income_range: (f64, f64),
    #[serde(rename = "educationLevels", default)]
    pub education_levels: BTreeSet<String>,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(rename = "locationPreferences", default)]
    pub location_preferences: BTreeSet<String>,
}

impl CustomerProfile {
    /// True when both ranges are ordered (`min <= max`)
    pub fn has_ordered_ranges(&self) -> bool {
        self.age_range.0 <= self.age_range.1 && self.income_range.0 <= self.income_range.1
    }
}

impl Default for CustomerProfile {
    fn default() -> Self {
        Self {
            age_range: (25.0, 45.0),
            income_range: (30_000.0, 60_000.0),
            education_levels: BTreeSet::new(),
            interests: BTreeSet::new(),
            location_preferences: BTreeSet::new(),
        }
    }
}

/// City record with demographic attributes
///
/// `match_score` and `reasons` are request-scoped: they are filled in by the
/// recommender and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDemographic {
    pub id: String,
    pub name: String,
    pub country: String,
    pub population: u64,
    #[serde(rename = "medianAge")]
    pub median_age: f64,
    #[serde(rename = "medianIncome")]
    pub median_income: f64,
    #[serde(rename = "employmentRate")]
    pub employment_rate: f64,
    #[serde(rename = "growthRate")]
    pub growth_rate: f64,
    #[serde(rename = "costOfLivingIndex")]
    pub cost_of_living_index: f64,
    #[serde(rename = "businessFriendlinessScore")]
    pub business_friendliness_score: f64,
    #[serde(rename = "educationLevel")]
    pub education_level: String,
    #[serde(rename = "industryFocus", default)]
    pub industry_focus: Vec<String>,
    #[serde(rename = "matchScore", default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl CityDemographic {
    /// Helper to get the match score, treating unscored cities as zero
    pub fn score(&self) -> f64 {
        self.match_score.unwrap_or(0.0)
    }
}

/// Filters pushed down to a city data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityFilters {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "minIncome", default)]
    pub min_income: Option<f64>,
    #[serde(rename = "maxIncome", default)]
    pub max_income: Option<f64>,
}

impl CityFilters {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Point values of the match rubric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRubric {
    pub age_points: f64,
    pub income_points: f64,
    pub education_points: f64,
    pub industry_points: f64,
    pub business_bonus_points: f64,
    /// Business friendliness must be strictly above this to earn the bonus
    pub business_threshold: f64,
    pub max_score: f64,
}

impl Default for ScoringRubric {
    fn default() -> Self {
        Self {
            age_points: 25.0,
            income_points: 30.0,
            education_points: 20.0,
            industry_points: 15.0,
            business_bonus_points: 10.0,
            business_threshold: 7.5,
            max_score: 100.0,
        }
    }
}

/// Where a pool of cities came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolOrigin {
    /// Queried from a live database
    Live,
    /// Embedded dataset serving as the configured source
    Static,
    /// Embedded dataset substituted after the live source failed
    Fallback,
}

/// Cities returned by a data source, tagged with their origin
#[derive(Debug, Clone)]
pub struct CityPool {
    pub cities: Vec<CityDemographic>,
    pub origin: PoolOrigin,
}

impl CityPool {
    pub fn live(cities: Vec<CityDemographic>) -> Self {
        Self { cities, origin: PoolOrigin::Live }
    }

    pub fn from_static(cities: Vec<CityDemographic>) -> Self {
        Self { cities, origin: PoolOrigin::Static }
    }

    pub fn fallback(cities: Vec<CityDemographic>) -> Self {
        Self { cities, origin: PoolOrigin::Fallback }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == PoolOrigin::Fallback
    }
}
