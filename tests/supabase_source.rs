// Supabase source tests against a mock PostgREST server

use mockito::Matcher;
use prospectify_engine::models::{CityFilters, PoolOrigin};
use prospectify_engine::services::{CitySource, FallbackCitySource, StaticCitySource, SupabaseCitySource};
use std::sync::Arc;
use std::time::Duration;

const CITIES_BODY: &str = r#"[
  {
    "id": "5f1c0000-0000-0000-0000-000000000001",
    "name": "Seville",
    "country": "Spain",
    "nuts_code": "ES618",
    "latitude": 37.39,
    "longitude": -5.98,
    "demographic_data": [{
      "city_id": "5f1c0000-0000-0000-0000-000000000001",
      "population": 1000,
      "age_0_14": 100,
      "age_15_24": 100,
      "age_25_49": 400,
      "age_50_64": 200,
      "age_65_plus": 200,
      "average_income": 27000.0,
      "higher_education_population": 300,
      "employed_population": 400,
      "labour_force": 500,
      "services_employment": 320,
      "industry_employment": 80,
      "growth_rate": 0.2,
      "cost_of_living_index": 64.0,
      "business_friendliness_score": 7.0
    }]
  },
  {
    "id": "5f1c0000-0000-0000-0000-000000000002",
    "name": "Broken",
    "country": "Spain",
    "demographic_data": [{
      "city_id": "5f1c0000-0000-0000-0000-000000000002",
      "population": 0,
      "age_0_14": 0,
      "age_15_24": 0,
      "age_25_49": 0,
      "age_50_64": 0,
      "age_65_plus": 0,
      "average_income": 0.0,
      "higher_education_population": 0,
      "employed_population": 0,
      "labour_force": 0,
      "services_employment": 0,
      "industry_employment": 0
    }]
  }
]"#;

fn source_for(server: &mockito::ServerGuard) -> SupabaseCitySource {
    SupabaseCitySource::new(server.url(), "anon_key".to_string(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_composes_rows_and_skips_invalid() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/cities")
        .match_query(Matcher::Any)
        .match_header("apikey", "anon_key")
        .match_header("authorization", "Bearer anon_key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CITIES_BODY)
        .create_async()
        .await;

    let pool = source_for(&server).fetch_cities(&CityFilters::none()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(pool.origin, PoolOrigin::Live);
    assert_eq!(pool.cities.len(), 1);

    let seville = &pool.cities[0];
    assert_eq!(seville.name, "Seville");
    assert_eq!(seville.median_age, 43.9);
    assert_eq!(seville.education_level, "High School");
    assert_eq!(seville.industry_focus, vec!["Services"]);
    assert_eq!(seville.employment_rate, 80.0);
}

#[tokio::test]
async fn test_filters_pushed_into_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/cities")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("country".into(), "ilike.Spain".into()),
            Matcher::UrlEncoded("demographic_data.average_income".into(), "gte.25000".into()),
        ]))
        .with_status(200)
        .with_body(CITIES_BODY)
        .create_async()
        .await;

    let filters = CityFilters {
        country: Some("Spain".to_string()),
        min_income: Some(25_000.0),
        max_income: None,
    };
    let pool = source_for(&server).fetch_cities(&filters).await.unwrap();

    mock.assert_async().await;
    assert_eq!(pool.cities.len(), 1);
}

#[tokio::test]
async fn test_missing_table_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/cities")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"code":"42P01","message":"relation \"public.cities\" does not exist"}"#)
        .create_async()
        .await;

    let result = source_for(&server).fetch_cities(&CityFilters::none()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_missing_table_falls_back_when_wrapped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/cities")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let source = FallbackCitySource::new(
        Arc::new(source_for(&server)),
        StaticCitySource::embedded(),
        Duration::from_secs(10),
    );
    let pool = source.fetch_cities(&CityFilters::none()).await.unwrap();

    assert_eq!(pool.origin, PoolOrigin::Fallback);
    assert_eq!(pool.cities.len(), StaticCitySource::embedded().cities().len());
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/cities")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{\"not\": \"a list\"}")
        .create_async()
        .await;

    let result = source_for(&server).fetch_cities(&CityFilters::none()).await;

    assert!(matches!(
        result,
        Err(prospectify_engine::services::SourceError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_one_to_one_embed_is_scored_live() {
    let body = r#"[{
        "id": "5f1c0000-0000-0000-0000-000000000003",
        "name": "Valencia",
        "country": "Spain",
        "demographic_data": {
            "city_id": "5f1c0000-0000-0000-0000-000000000003",
            "population": 800000,
            "age_0_14": 110000,
            "age_15_24": 80000,
            "age_25_49": 300000,
            "age_50_64": 170000,
            "age_65_plus": 140000,
            "average_income": 32000.0,
            "higher_education_population": 420000,
            "employed_population": 340000,
            "labour_force": 380000,
            "services_employment": 280000,
            "industry_employment": 60000,
            "business_friendliness_score": 7.4
        }
    }]"#;

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/cities")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    let source = FallbackCitySource::new(
        Arc::new(source_for(&server)),
        StaticCitySource::embedded(),
        Duration::from_secs(10),
    );
    let pool = source.fetch_cities(&CityFilters::none()).await.unwrap();

    assert_eq!(pool.origin, PoolOrigin::Live);
    assert_eq!(pool.cities.len(), 1);
    assert_eq!(pool.cities[0].name, "Valencia");
    assert_eq!(pool.cities[0].education_level, "University");
    assert_eq!(pool.cities[0].business_friendliness_score, 7.4);
}
