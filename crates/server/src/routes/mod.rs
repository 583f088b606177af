use actix_web::{error::InternalError, web, HttpResponse};

use crate::types::ErrorResponse;

mod health;
mod search;

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(health::health)
        .service(search::search)
        .service(search::search_stats);
}

/// Reject unreadable JSON bodies with the same error shape as other failures
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorResponse {
            error: err.to_string(),
        });
        InternalError::from_response(err, response).into()
    })
}
