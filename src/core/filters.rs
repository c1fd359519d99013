use crate::models::{CityDemographic, CityFilters};
use std::collections::BTreeSet;

/// Inclusive range check against a `(min, max)` pair
///
/// An inverted range (`min > max`) never contains anything.
#[inline]
pub fn in_range(value: f64, range: (f64, f64)) -> bool {
    value >= range.0 && value <= range.1
}

/// Check if a city passes the data-source filters
///
/// Country is compared case-insensitively; income bounds are inclusive
/// against the city's median income.
#[inline]
pub fn matches_filters(city: &CityDemographic, filters: &CityFilters) -> bool {
    if let Some(country) = &filters.country {
        if !city.country.eq_ignore_ascii_case(country.trim()) {
            return false;
        }
    }

    if let Some(min_income) = filters.min_income {
        if city.median_income < min_income {
            return false;
        }
    }

    if let Some(max_income) = filters.max_income {
        if city.median_income > max_income {
            return false;
        }
    }

    true
}

/// Industries of a city that match any of the profile's interests
///
/// A city industry matches when it contains, or is contained by, an
/// interest, ignoring case. Each industry is listed at most once, in the
/// city's order.
pub fn matching_industries(city: &CityDemographic, interests: &BTreeSet<String>) -> Vec<String> {
    let interests: Vec<String> = interests
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .collect();

    city.industry_focus
        .iter()
        .filter(|industry| {
            let industry = industry.to_lowercase();
            interests
                .iter()
                .any(|interest| industry.contains(interest.as_str()) || interest.contains(industry.as_str()))
        })
        .cloned()
        .collect()
}

/// Case-insensitive substring search over name, country and industry focus
///
/// A blank query matches every city.
pub fn matches_search(city: &CityDemographic, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    city.name.to_lowercase().contains(&needle)
        || city.country.to_lowercase().contains(&needle)
        || city
            .industry_focus
            .iter()
            .any(|industry| industry.to_lowercase().contains(&needle))
}
