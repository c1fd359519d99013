use crate::models::CustomerProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Parse an unsigned integer from user input, falling back to `default`
///
/// Surrounding whitespace and thousands separators (`,` and `_`) are
/// ignored. Anything else that does not parse yields the default.
pub fn parse_u32_or_default(input: &str, default: u32) -> u32 {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned.parse().unwrap_or(default)
}

/// Parse a finite number from user input, falling back to `default`
///
/// `NaN` and infinities are treated as invalid input.
pub fn parse_f64_or_default(input: &str, default: f64) -> f64 {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => default,
    }
}

/// Add or remove a checkbox value from a set
///
/// Blank values are ignored.
pub fn toggle(set: &mut BTreeSet<String>, value: &str, checked: bool) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if checked {
        set.insert(value.to_string());
    } else {
        set.remove(value);
    }
}

/// Raw profile form input as typed by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(rename = "minAge", default)]
    pub min_age: String,
    #[serde(rename = "maxAge", default)]
    pub max_age: String,
    #[serde(rename = "minIncome", default)]
    pub min_income: String,
    #[serde(rename = "maxIncome", default)]
    pub max_income: String,
    #[serde(rename = "educationLevels", default)]
    pub education_levels: BTreeSet<String>,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(rename = "locationPreferences", default)]
    pub location_preferences: BTreeSet<String>,
}

impl ProfileForm {
    /// Normalize the form into a `CustomerProfile`
    ///
    /// Numeric fields that fail to parse become 0. Ages are floored to whole
    /// years and, like incomes, never negative. An inverted range is swapped so that
    /// `min <= max` always holds for profiles built from a form.
    pub fn into_profile(self) -> CustomerProfile {
        let age_range = ordered(
            whole_years(&self.min_age),
            whole_years(&self.max_age),
        );
        let income_range = ordered(
            parse_f64_or_default(&self.min_income, 0.0).max(0.0),
            parse_f64_or_default(&self.max_income, 0.0).max(0.0),
        );

        CustomerProfile {
            age_range,
            income_range,
            education_levels: clean_set(self.education_levels),
            interests: clean_set(self.interests),
            location_preferences: clean_set(self.location_preferences),
        }
    }
}

#[inline]
fn whole_years(input: &str) -> f64 {
    parse_f64_or_default(input, 0.0).floor().max(0.0)
}

#[inline]
fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn clean_set(values: BTreeSet<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
