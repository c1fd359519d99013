use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::{Validate, ValidationError};

use crate::models::domain::{CityFilters, CustomerProfile};

/// Request to rank cities for a customer profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_ranges"))]
pub struct RecommendationRequest {
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

fn validate_ranges(req: &RecommendationRequest) -> Result<(), ValidationError> {
    let ranges = [("ageRange", req.age_range), ("incomeRange", req.income_range)];

    for (field, (min, max)) in ranges {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            let mut err = ValidationError::new("negative_or_invalid_bound");
            err.message = Some(format!("{} bounds must be finite and non-negative", field).into());
            return Err(err);
        }
        if min > max {
            let mut err = ValidationError::new("inverted_range");
            err.message = Some(format!("{} minimum must not exceed maximum", field).into());
            return Err(err);
        }
    }

    Ok(())
}

impl From<RecommendationRequest> for CustomerProfile {
    fn from(req: RecommendationRequest) -> Self {
        CustomerProfile {
            age_range: req.age_range,
            income_range: req.income_range,
            education_levels: req.education_levels,
            interests: req.interests,
            location_preferences: req.location_preferences,
        }
    }
}

/// Query string for listing cities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitiesQuery {
    pub country: Option<String>,
    #[serde(rename = "minIncome")]
    pub min_income: Option<f64>,
    #[serde(rename = "maxIncome")]
    pub max_income: Option<f64>,
}

impl From<CitiesQuery> for CityFilters {
    fn from(query: CitiesQuery) -> Self {
        CityFilters {
            country: query.country.filter(|c| !c.trim().is_empty()),
            min_income: query.min_income,
            max_income: query.max_income,
        }
    }
}

/// Query string for free-text city search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
