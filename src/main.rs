use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use prospectify_engine::config::Settings;
use prospectify_engine::core::Recommender;
use prospectify_engine::routes::{
    self, handle_json_payload_error, handle_query_payload_error, recommendations::AppState,
};
use prospectify_engine::services::{build_city_source, RecommendationService};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Prospectify recommendation engine...");

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e))
    })?;

    info!("Configuration loaded successfully");

    // Build the city source (falls back to the embedded dataset on its own)
    let source = build_city_source(&settings.source).await;

    // Initialize recommender with configured rubric
    let rubric = settings.rubric();
    let recommender = Recommender::new(rubric);

    info!("Recommender initialized with rubric: {:?}", recommender.rubric());

    // Build application state
    let app_state = AppState {
        service: Arc::new(RecommendationService::new(source, recommender)),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
