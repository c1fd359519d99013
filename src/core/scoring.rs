use crate::models::{CityDemographic, CustomerProfile, ScoringRubric};
use crate::core::filters::{in_range, matching_industries};

/// Calculate a match score (0-100) for a city against a customer profile
///
/// Additive rubric, each criterion independent:
/// score = min(
///     age_match        * 25 +   # median age within age range (inclusive)
///     income_match     * 30 +   # median income within income range (inclusive)
///     education_match  * 20 +   # education level in the profile's levels
///     industry_match   * 15 +   # any industry/interest overlap, awarded once
///     business_bonus   * 10,    # business friendliness above 7.5
///     100
/// )
///
/// Returns the score together with one reason per awarded criterion, in
/// rubric order.
pub fn calculate_match_score(
    city: &CityDemographic,
    profile: &CustomerProfile,
    rubric: &ScoringRubric,
) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    // Age
    if in_range(city.median_age, profile.age_range) {
        score += rubric.age_points;
        reasons.push(format!(
            "Median age {:.1} fits target range {}-{}",
            city.median_age, profile.age_range.0, profile.age_range.1
        ));
    }

    // Income
    if in_range(city.median_income, profile.income_range) {
        score += rubric.income_points;
        reasons.push(format!(
            "Median income €{} is within target income range",
            format_thousands(city.median_income)
        ));
    }

    // Education
    if profile.education_levels.contains(&city.education_level) {
        score += rubric.education_points;
        reasons.push(format!("{} education level matches target", city.education_level));
    }

    // Industry / interests
    let industries = matching_industries(city, &profile.interests);
    if !industries.is_empty() {
        score += rubric.industry_points;
        reasons.push(format!("Strong {} sector aligns with interests", industries.join(", ")));
    }

    // Business friendliness bonus
    if city.business_friendliness_score > rubric.business_threshold {
        score += rubric.business_bonus_points;
        reasons.push(format!(
            "Business-friendly environment ({:.1}/10)",
            city.business_friendliness_score
        ));
    }

    (score.min(rubric.max_score).max(0.0), reasons)
}

/// Format a currency amount with thousands separators, no decimals
pub fn format_thousands(amount: f64) -> String {
    let rounded = amount.round().max(0.0) as u64;
    let digits = rounded.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
