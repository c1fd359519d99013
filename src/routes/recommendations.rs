use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::models::{
    CitiesQuery, CitiesResponse, CityFilters, CustomerProfile, ErrorResponse, HealthResponse,
    RecommendationRequest, RecommendationResponse, SearchQuery,
};
use crate::services::RecommendationService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
}

/// Configure all recommendation-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::post().to(recommend))
        .route("/cities", web::get().to(list_cities))
        .route("/cities/search", web::get().to(search_cities));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = match state.service.source().health_check().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!("City source health check failed: {}", e);
            "degraded"
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: state.service.source_name().to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommendations endpoint
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "ageRange": [25, 45],
///   "incomeRange": [30000, 60000],
///   "educationLevels": ["University"],
///   "interests": ["Technology"],
///   "locationPreferences": ["Spain"]
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendation request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let profile = CustomerProfile::from(req.into_inner());

    tracing::info!(
        "Recommending cities for request {} (age {:?}, income {:?}, {} interests)",
        request_id,
        profile.age_range,
        profile.income_range,
        profile.interests.len()
    );

    let recommendations = state.service.get_city_recommendations(&profile).await;

    HttpResponse::Ok().json(RecommendationResponse {
        total_results: recommendations.len(),
        recommendations,
        request_id,
        generated_at: chrono::Utc::now(),
    })
}

/// List cities with demographics
///
/// GET /api/v1/cities?country={country}&minIncome={n}&maxIncome={n}
async fn list_cities(
    state: web::Data<AppState>,
    query: web::Query<CitiesQuery>,
) -> impl Responder {
    let filters = CityFilters::from(query.into_inner());

    let cities = state
        .service
        .get_cities_with_demographics(filters.country, filters.min_income, filters.max_income)
        .await;

    HttpResponse::Ok().json(CitiesResponse {
        count: cities.len(),
        cities,
    })
}

/// Search cities by name, country or industry
///
/// GET /api/v1/cities/search?q={query}
async fn search_cities(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let cities = state.service.search_cities(&query.q).await;

    HttpResponse::Ok().json(CitiesResponse {
        count: cities.len(),
        cities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Recommender;
    use crate::services::StaticCitySource;
    use actix_web::{test, App};

    fn app_state() -> AppState {
        let service = RecommendationService::new(
            Arc::new(StaticCitySource::embedded()),
            Recommender::default(),
        );
        AppState { service: Arc::new(service) }
    }

    #[actix_web::test]
    async fn test_recommend_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/recommendations")
            .set_json(serde_json::json!({
                "ageRange": [25, 45],
                "incomeRange": [30000, 60000],
                "educationLevels": ["University"],
                "interests": ["Technology"],
                "locationPreferences": ["Spain"]
            }))
            .to_request();
        let resp: RecommendationResponse = test::call_and_read_body_json(&app, req).await;

        assert!(resp.total_results <= 10);
        assert_eq!(resp.total_results, resp.recommendations.len());
        assert_eq!(resp.recommendations[0].match_score, Some(100.0));
    }

    #[actix_web::test]
    async fn test_inverted_range_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/recommendations")
            .set_json(serde_json::json!({
                "ageRange": [45, 25],
                "incomeRange": [30000, 60000]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_list_cities_filtered() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/cities?country=france&minIncome=40000")
            .to_request();
        let resp: CitiesResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.count, 1);
        assert_eq!(resp.cities[0].name, "Paris");
    }

    #[actix_web::test]
    async fn test_health_reports_source() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.status, "healthy");
        assert_eq!(resp.source, "static");
    }
}
