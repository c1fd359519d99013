use crate::models::{CityDemographic, CityRow, DemographicRow};
use thiserror::Error;

/// Midpoint ages used to estimate the median age from population buckets
const AGE_BUCKET_MIDPOINTS: [f64; 5] = [7.0, 19.5, 37.0, 57.0, 75.0];

const DEFAULT_GROWTH_RATE: f64 = 0.0;
const DEFAULT_COST_OF_LIVING_INDEX: f64 = 100.0;
const DEFAULT_BUSINESS_FRIENDLINESS: f64 = 5.0;

pub const EDUCATION_UNIVERSITY: &str = "University";
pub const EDUCATION_HIGH_SCHOOL: &str = "High School";
pub const INDUSTRY_SERVICES: &str = "Services";
pub const INDUSTRY_INDUSTRY: &str = "Industry";

/// Reasons a raw row pair cannot be composed into a city record
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("demographic row for {demo_city_id} does not belong to city {city_id}")]
    CityMismatch { city_id: String, demo_city_id: String },

    #[error("city {0} has zero population")]
    ZeroPopulation(String),

    #[error("city {city_id} has a negative value for {field}")]
    NegativeCount { city_id: String, field: &'static str },

    #[error("city {0} has no population in any age bucket")]
    EmptyAgeBuckets(String),

    #[error("city {0} has a non-finite income")]
    InvalidIncome(String),
}

/// Estimate the median age as the population-weighted mean of bucket midpoints
///
/// Buckets are `[0-14, 15-24, 25-49, 50-64, 65+]`. Returns `None` when all
/// buckets are empty. The estimate is rounded to one decimal.
pub fn estimate_median_age(buckets: [i64; 5]) -> Option<f64> {
    let total: i64 = buckets.iter().sum();
    if total <= 0 {
        return None;
    }

    let weighted: f64 = buckets
        .iter()
        .zip(AGE_BUCKET_MIDPOINTS.iter())
        .map(|(&count, &mid)| count as f64 * mid)
        .sum();

    Some((weighted * 10.0 / total as f64).round() / 10.0)
}

/// "University" when more than half the population holds higher education
#[inline]
pub fn categorize_education(higher_education_population: i64, population: i64) -> &'static str {
    if higher_education_population as f64 > population as f64 * 0.5 {
        EDUCATION_UNIVERSITY
    } else {
        EDUCATION_HIGH_SCHOOL
    }
}

/// Dominant employment sector; ties go to industry
#[inline]
pub fn categorize_industry(services_employment: i64, industry_employment: i64) -> Vec<String> {
    if services_employment > industry_employment {
        vec![INDUSTRY_SERVICES.to_string()]
    } else {
        vec![INDUSTRY_INDUSTRY.to_string()]
    }
}

/// Employment rate in percent, clamped to 0-100
#[inline]
pub fn employment_rate(employed: i64, labour_force: i64) -> f64 {
    if labour_force <= 0 {
        return 0.0;
    }
    let per_mille = (employed as f64 * 1000.0 / labour_force as f64).round();
    per_mille.clamp(0.0, 1000.0) / 10.0
}

impl CityDemographic {
    /// Compose a city record from its `cities` and `demographic_data` rows
    ///
    /// This is the only place raw rows become `CityDemographic`. All derived
    /// fields are deterministic given the rows.
    pub fn from_rows(city: &CityRow, demo: &DemographicRow) -> Result<Self, RowError> {
        if city.id != demo.city_id {
            return Err(RowError::CityMismatch {
                city_id: city.id.clone(),
                demo_city_id: demo.city_id.clone(),
            });
        }

        let counts: [(&'static str, i64); 11] = [
            ("population", demo.population),
            ("age_0_14", demo.age_0_14),
            ("age_15_24", demo.age_15_24),
            ("age_25_49", demo.age_25_49),
            ("age_50_64", demo.age_50_64),
            ("age_65_plus", demo.age_65_plus),
            ("higher_education_population", demo.higher_education_population),
            ("employed_population", demo.employed_population),
            ("labour_force", demo.labour_force),
            ("services_employment", demo.services_employment),
            ("industry_employment", demo.industry_employment),
        ];
        if let Some((field, _)) = counts.iter().find(|(_, value)| *value < 0) {
            return Err(RowError::NegativeCount { city_id: city.id.clone(), field: *field });
        }

        if demo.population == 0 {
            return Err(RowError::ZeroPopulation(city.id.clone()));
        }

        if !demo.average_income.is_finite() || demo.average_income < 0.0 {
            return Err(RowError::InvalidIncome(city.id.clone()));
        }

        let median_age = estimate_median_age([
            demo.age_0_14,
            demo.age_15_24,
            demo.age_25_49,
            demo.age_50_64,
            demo.age_65_plus,
        ])
        .ok_or_else(|| RowError::EmptyAgeBuckets(city.id.clone()))?;

        Ok(CityDemographic {
            id: city.id.clone(),
            name: city.name.clone(),
            country: city.country.clone(),
            population: demo.population as u64,
            median_age,
            median_income: demo.average_income,
            employment_rate: employment_rate(demo.employed_population, demo.labour_force),
            growth_rate: demo.growth_rate.unwrap_or(DEFAULT_GROWTH_RATE),
            cost_of_living_index: demo.cost_of_living_index.unwrap_or(DEFAULT_COST_OF_LIVING_INDEX),
            business_friendliness_score: demo
                .business_friendliness_score
                .unwrap_or(DEFAULT_BUSINESS_FRIENDLINESS)
                .clamp(0.0, 10.0),
            education_level: categorize_education(demo.higher_education_population, demo.population)
                .to_string(),
            industry_focus: categorize_industry(demo.services_employment, demo.industry_employment),
            match_score: None,
            reasons: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city_row() -> CityRow {
        CityRow {
            id: "c-1".to_string(),
            name: "Valencia".to_string(),
            country: "Spain".to_string(),
            nuts_code: Some("ES523".to_string()),
            latitude: Some(39.47),
            longitude: Some(-0.38),
        }
    }

    fn demo_row() -> DemographicRow {
        DemographicRow {
            city_id: "c-1".to_string(),
            population: 1000,
            age_0_14: 100,
            age_15_24: 100,
            age_25_49: 400,
            age_50_64: 200,
            age_65_plus: 200,
            average_income: 28_000.0,
            higher_education_population: 600,
            employed_population: 450,
            labour_force: 500,
            services_employment: 300,
            industry_employment: 150,
            growth_rate: Some(1.2),
            cost_of_living_index: None,
            business_friendliness_score: Some(7.9),
        }
    }

    #[test]
    fn test_median_age_weighted_mean() {
        // (100*7 + 100*19.5 + 400*37 + 200*57 + 200*75) / 1000 = 43.85 -> 43.9
        let age = estimate_median_age([100, 100, 400, 200, 200]).unwrap();
        assert_eq!(age, 43.9);
    }

    #[test]
    fn test_median_age_empty_buckets() {
        assert!(estimate_median_age([0, 0, 0, 0, 0]).is_none());
    }

    #[test]
    fn test_education_threshold_is_strict() {
        assert_eq!(categorize_education(501, 1000), EDUCATION_UNIVERSITY);
        assert_eq!(categorize_education(500, 1000), EDUCATION_HIGH_SCHOOL);
    }

    #[test]
    fn test_industry_tie_goes_to_industry() {
        assert_eq!(categorize_industry(10, 5), vec!["Services"]);
        assert_eq!(categorize_industry(5, 5), vec!["Industry"]);
    }

    #[test]
    fn test_employment_rate() {
        assert_eq!(employment_rate(450, 500), 90.0);
        assert_eq!(employment_rate(10, 0), 0.0);
        assert_eq!(employment_rate(600, 500), 100.0);
    }

    #[test]
    fn test_from_rows_derives_fields() {
        let city = CityDemographic::from_rows(&city_row(), &demo_row()).unwrap();

        assert_eq!(city.name, "Valencia");
        assert_eq!(city.median_age, 43.9);
        assert_eq!(city.education_level, "University");
        assert_eq!(city.industry_focus, vec!["Services"]);
        assert_eq!(city.employment_rate, 90.0);
        assert_eq!(city.cost_of_living_index, 100.0);
        assert_eq!(city.business_friendliness_score, 7.9);
        assert!(city.match_score.is_none());
        assert!(city.reasons.is_empty());
    }

    #[test]
    fn test_from_rows_rejects_mismatched_city() {
        let mut demo = demo_row();
        demo.city_id = "other".to_string();
        assert!(matches!(
            CityDemographic::from_rows(&city_row(), &demo),
            Err(RowError::CityMismatch { .. })
        ));
    }

    #[test]
    fn test_from_rows_rejects_negative_counts() {
        let mut demo = demo_row();
        demo.labour_force = -1;
        assert_eq!(
            CityDemographic::from_rows(&city_row(), &demo),
            Err(RowError::NegativeCount { city_id: "c-1".to_string(), field: "labour_force" })
        );
    }

    #[test]
    fn test_from_rows_rejects_zero_population() {
        let mut demo = demo_row();
        demo.population = 0;
        assert_eq!(
            CityDemographic::from_rows(&city_row(), &demo),
            Err(RowError::ZeroPopulation("c-1".to_string()))
        );
    }
}
