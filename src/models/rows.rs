use serde::{Deserialize, Deserializer, Serialize};

/// Raw row from the `cities` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRow {
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub nuts_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Raw row from the `demographic_data` table, keyed by `city_id`
///
/// Counts are signed so that corrupt negative values can be detected and
/// rejected by the mapping instead of wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicRow {
    pub city_id: String,
    pub population: i64,
    pub age_0_14: i64,
    pub age_15_24: i64,
    pub age_25_49: i64,
    pub age_50_64: i64,
    pub age_65_plus: i64,
    pub average_income: f64,
    pub higher_education_population: i64,
    pub employed_population: i64,
    pub labour_force: i64,
    pub services_employment: i64,
    pub industry_employment: i64,
    #[serde(default)]
    pub growth_rate: Option<f64>,
    #[serde(default)]
    pub cost_of_living_index: Option<f64>,
    #[serde(default)]
    pub business_friendliness_score: Option<f64>,
}

/// A city joined with its demographic rows, as returned by a PostgREST embed
///
/// `demographic_data` is keyed by `city_id`, so PostgREST embeds it as a
/// single object. Array and `null` embeds are accepted as well.
#[derive(Debug, Clone, Deserialize)]
pub struct CityWithDemographics {
    #[serde(flatten)]
    pub city: CityRow,
    #[serde(default, deserialize_with = "one_or_many")]
    pub demographic_data: Vec<DemographicRow>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Embedded {
    One(DemographicRow),
    Many(Vec<DemographicRow>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<DemographicRow>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Embedded>::deserialize(deserializer)? {
        Some(Embedded::One(row)) => vec![row],
        Some(Embedded::Many(rows)) => rows,
        None => Vec::new(),
    })
}
