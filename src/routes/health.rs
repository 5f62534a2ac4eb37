// src/routes/health.rs
use actix_web::{HttpResponse, get, web};
use serde_json::json;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "message": "Education Platform API is running",
    }))
}
