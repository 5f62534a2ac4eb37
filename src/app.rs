// src/app.rs
//! Route table shared by the server binary and the HTTP tests.
use crate::auth;
use crate::errors::AppError;
use crate::routes;
use actix_cors::Cors;
use actix_web::{error::Error, web};

fn bad_request(err: impl std::fmt::Display) -> Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Registers every route plus extractor configs that render malformed
/// bodies, query strings and path segments as `400 {"error": ...}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _| bad_request(err)))
        .service(
            web::scope("/api")
                .configure(routes::health::init_routes)
                .configure(auth::init_routes)
                .configure(routes::users::init_routes)
                .configure(routes::content::init_routes)
                .configure(routes::categories::init_routes)
                .configure(routes::enrollments::init_routes)
                .configure(routes::reviews::init_routes)
                .configure(routes::progress::init_routes)
                .configure(routes::search::init_routes),
        )
        .configure(routes::frontend::init_routes);
}

/// CORS for the JSON API; `None` allows any origin.
pub fn cors(allowed_origins: Option<&[String]>) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    match allowed_origins {
        None => cors.allow_any_origin(),
        Some(origins) => origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin)),
    }
}
