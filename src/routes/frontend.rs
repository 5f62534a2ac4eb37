// src/routes/frontend.rs
//! The two bundled HTML pages. They are compiled into the binary.
use actix_web::{HttpResponse, get, http::header::ContentType, web};

const INDEX_HTML: &str = include_str!("../../static/index.html");
const DASHBOARD_HTML: &str = include_str!("../../static/dashboard.html");

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index);
    cfg.service(dashboard);
}

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

#[get("/dashboard")]
pub async fn dashboard() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(DASHBOARD_HTML)
}
