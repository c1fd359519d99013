// Route exports
pub mod recommendations;

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::models::ErrorResponse;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(recommendations::configure),
    );
}

fn bad_request<E>(err: E, error: &str, message: String) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let body = ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    };
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Answer malformed JSON bodies with an `ErrorResponse`
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let message = format!("Invalid JSON: {}", err);
    bad_request(err, "invalid_json", message)
}

/// Answer unparseable query strings with an `ErrorResponse`
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    let message = format!("Invalid query: {}", err);
    bad_request(err, "invalid_query", message)
}
