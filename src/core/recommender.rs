use crate::models::{CityDemographic, CustomerProfile, ScoringRubric};
use crate::core::scoring::calculate_match_score;
use rand::Rng;

/// Maximum number of cities returned by a recommendation
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Score range used when the live source is unavailable
pub const DEGRADED_SCORE_RANGE: std::ops::RangeInclusive<u32> = 60..=100;

/// Reason attached to every degraded recommendation
pub const DEGRADED_REASON: &str = "Strong overall market potential";

/// Ranks a pool of cities against a customer profile
///
/// # Pipeline Stages
/// 1. Score every city with the rubric
/// 2. Stable sort by score, descending (ties keep pool order)
/// 3. Truncate to the top ten
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    rubric: ScoringRubric,
}

impl Recommender {
    pub fn new(rubric: ScoringRubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &ScoringRubric {
        &self.rubric
    }

    /// Score and rank cities for a profile
    ///
    /// The pool is not modified; scored copies are returned. The result is a
    /// pure function of `(profile, pool)`.
    pub fn recommend(
        &self,
        profile: &CustomerProfile,
        pool: &[CityDemographic],
    ) -> Vec<CityDemographic> {
        let scored: Vec<CityDemographic> = pool
            .iter()
            .map(|city| {
                let (score, reasons) = calculate_match_score(city, profile, &self.rubric);
                CityDemographic {
                    match_score: Some(score),
                    reasons,
                    ..city.clone()
                }
            })
            .collect();

        rank(scored)
    }

    /// Rank cities with placeholder scores when live data is unavailable
    ///
    /// Each city gets a random integer score in 60-100 and a single generic
    /// reason. Used only on the degraded path, never for live data.
    pub fn degraded<R: Rng>(
        &self,
        pool: &[CityDemographic],
        rng: &mut R,
    ) -> Vec<CityDemographic> {
        let scored: Vec<CityDemographic> = pool
            .iter()
            .map(|city| CityDemographic {
                match_score: Some(rng.gen_range(DEGRADED_SCORE_RANGE) as f64),
                reasons: vec![DEGRADED_REASON.to_string()],
                ..city.clone()
            })
            .collect();

        rank(scored)
    }
}

/// Stable descending sort by score, then cap at `MAX_RECOMMENDATIONS`
fn rank(mut cities: Vec<CityDemographic>) -> Vec<CityDemographic> {
    // `sort_by` is stable, so equal scores keep their pool order
    cities.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    cities.truncate(MAX_RECOMMENDATIONS);
    cities
}
