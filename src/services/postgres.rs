use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::{CityDemographic, CityFilters, CityPool, CityRow, DemographicRow};
use crate::services::source::{CitySource, SourceError};

/// Cities joined with their demographics; filters are optional binds
const CITIES_QUERY: &str = r#"
    SELECT
        c.id::text AS id,
        c.name,
        c.country,
        c.nuts_code,
        c.latitude,
        c.longitude,
        d.city_id::text AS city_id,
        d.population,
        d.age_0_14,
        d.age_15_24,
        d.age_25_49,
        d.age_50_64,
        d.age_65_plus,
        d.average_income,
        d.higher_education_population,
        d.employed_population,
        d.labour_force,
        d.services_employment,
        d.industry_employment,
        d.growth_rate,
        d.cost_of_living_index,
        d.business_friendliness_score
    FROM cities c
    JOIN demographic_data d ON d.city_id = c.id
    WHERE ($1::text IS NULL OR lower(c.country) = lower($1))
      AND ($2::float8 IS NULL OR d.average_income >= $2)
      AND ($3::float8 IS NULL OR d.average_income <= $3)
    ORDER BY c.name
"#;

/// Direct PostgreSQL city source
///
/// Reads the same `cities` / `demographic_data` schema Supabase exposes, for
/// deployments that connect to the database without the REST layer.
pub struct PostgresCitySource {
    pool: PgPool,
}

impl PostgresCitySource {
    /// Connect and run migrations
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, SourceError> {
        tracing::info!("Connecting to PostgreSQL (max: {} connections)", max_connections);

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

/// Split a joined row into its `cities` and `demographic_data` parts
fn split_row(row: &PgRow) -> Result<(CityRow, DemographicRow), sqlx::Error> {
    let city = CityRow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        country: row.try_get("country")?,
        nuts_code: row.try_get("nuts_code")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    };

    let demo = DemographicRow {
        city_id: row.try_get("city_id")?,
        population: row.try_get("population")?,
        age_0_14: row.try_get("age_0_14")?,
        age_15_24: row.try_get("age_15_24")?,
        age_25_49: row.try_get("age_25_49")?,
        age_50_64: row.try_get("age_50_64")?,
        age_65_plus: row.try_get("age_65_plus")?,
        average_income: row.try_get("average_income")?,
        higher_education_population: row.try_get("higher_education_population")?,
        employed_population: row.try_get("employed_population")?,
        labour_force: row.try_get("labour_force")?,
        services_employment: row.try_get("services_employment")?,
        industry_employment: row.try_get("industry_employment")?,
        growth_rate: row.try_get("growth_rate")?,
        cost_of_living_index: row.try_get("cost_of_living_index")?,
        business_friendliness_score: row.try_get("business_friendliness_score")?,
    };

    Ok((city, demo))
}

/// Compose city records from joined rows, skipping any row that fails to
/// decode or validate
fn compose_rows<R>(
    rows: &[R],
    split: impl Fn(&R) -> Result<(CityRow, DemographicRow), sqlx::Error>,
) -> Vec<CityDemographic> {
    let mut cities = Vec::with_capacity(rows.len());
    for row in rows {
        let (city, demo) = match split(row) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!("Skipping undecodable city row: {}", e);
                continue;
            }
        };
        match CityDemographic::from_rows(&city, &demo) {
            Ok(composed) => cities.push(composed),
            Err(e) => tracing::warn!("Skipping city {}: {}", city.name, e),
        }
    }
    cities
}

#[async_trait]
impl CitySource for PostgresCitySource {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_cities(&self, filters: &CityFilters) -> Result<CityPool, SourceError> {
        let country = filters.country.as_deref().map(str::trim);

        let rows = sqlx::query(CITIES_QUERY)
            .bind(country)
            .bind(filters.min_income)
            .bind(filters.max_income)
            .fetch_all(&self.pool)
            .await?;

        let cities = compose_rows(&rows, split_row);

        tracing::debug!("Composed {} cities (rows: {})", cities.len(), rows.len());

        Ok(CityPool::live(cities))
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }
}
