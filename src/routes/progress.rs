// src/routes/progress.rs
use crate::auth::guards::CurrentUser;
use crate::db;
use crate::db::progress::ProgressPatch;
use crate::errors::{AppError, AppResult};
use crate::models::{Pagination, ProgressListQuery, UpsertProgressRequest};
use actix_web::{HttpResponse, get, post, web};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_progress);
    cfg.service(upsert_progress);
    cfg.service(get_content_progress);
    cfg.service(toggle_bookmark);
}

#[get("/progress")]
pub async fn list_progress(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    query: web::Query<ProgressListQuery>,
) -> AppResult<HttpResponse> {
    let page = Pagination::new(query.page, query.per_page);
    let bookmarked_only = query.bookmarked.unwrap_or(false);
    let (items, total) =
        db::progress::list_for_user(pool.get_ref(), user.id, bookmarked_only, page).await?;

    Ok(HttpResponse::Ok().json(json!({
        "progress": items,
        "pagination": page.meta(total),
    })))
}

#[post("/progress")]
pub async fn upsert_progress(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    req: web::Json<UpsertProgressRequest>,
) -> AppResult<HttpResponse> {
    let req = req.into_inner();
    req.validate().map_err(AppError::BadRequest)?;

    if db::content::get_content(pool.get_ref(), req.content_id).await?.is_none() {
        return Err(AppError::not_found("Content"));
    }

    let patch = ProgressPatch {
        completion_percentage: req.clamped_percentage(),
        last_position: req.last_position,
        notes: req.notes,
        bookmarked: req.bookmarked,
    };
    let progress =
        db::progress::upsert_progress(pool.get_ref(), user.id, req.content_id, &patch).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Progress updated successfully",
        "progress": progress,
    })))
}

#[get("/progress/content/{content_id}")]
pub async fn get_content_progress(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let content_id = path.into_inner();
    match db::progress::find_progress(pool.get_ref(), user.id, content_id).await? {
        Some(progress) => Ok(HttpResponse::Ok().json(json!({ "progress": progress }))),
        None => Ok(HttpResponse::Ok().json(json!({
            "message": "No progress found",
            "progress": {
                "content_id": content_id,
                "completion_percentage": 0.0,
                "bookmarked": false,
            },
        }))),
    }
}

#[post("/progress/content/{content_id}/bookmark")]
pub async fn toggle_bookmark(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let content_id = path.into_inner();
    if db::content::get_content(pool.get_ref(), content_id).await?.is_none() {
        return Err(AppError::not_found("Content"));
    }
    let progress = db::progress::toggle_bookmark(pool.get_ref(), user.id, content_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Bookmark toggled successfully",
        "bookmarked": progress.bookmarked,
    })))
}
