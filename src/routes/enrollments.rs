// src/routes/enrollments.rs
use crate::auth::guards::CurrentUser;
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CreateEnrollmentRequest, Enrollment, EnrollmentListQuery, Pagination, UpdateEnrollmentRequest,
};
use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_enrollments);
    cfg.service(create_enrollment);
    cfg.service(update_enrollment);
    cfg.service(delete_enrollment);
}

#[get("/enrollments")]
pub async fn list_enrollments(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    query: web::Query<EnrollmentListQuery>,
) -> AppResult<HttpResponse> {
    let page = Pagination::new(query.page, query.per_page);
    let (enrollments, total) =
        db::enrollments::list_for_user(pool.get_ref(), user.id, query.is_completed, page).await?;

    Ok(HttpResponse::Ok().json(json!({
        "enrollments": enrollments,
        "pagination": page.meta(total),
    })))
}

#[post("/enrollments")]
pub async fn create_enrollment(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    req: web::Json<CreateEnrollmentRequest>,
) -> AppResult<HttpResponse> {
    let content_id = req.content_id;
    let content = db::content::get_content(pool.get_ref(), content_id)
        .await?
        .ok_or_else(|| AppError::not_found("Content"))?;

    if let Some(existing) = db::enrollments::find_enrollment(pool.get_ref(), user.id, content_id).await? {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Already enrolled",
            "enrollment": existing,
        })));
    }
    if !content.is_published {
        return Err(AppError::bad_request("Content is not published"));
    }

    let enrollment = Enrollment::new(user.id, content_id);
    match db::enrollments::insert_if_absent(pool.get_ref(), &enrollment).await? {
        Some(created) => {
            tracing::info!("User {} enrolled in {}", user.id, content_id);
            Ok(HttpResponse::Created().json(json!({
                "message": "Enrolled successfully",
                "enrollment": created,
            })))
        }
        // Lost a race with a concurrent request for the same pair.
        None => {
            let existing = db::enrollments::find_enrollment(pool.get_ref(), user.id, content_id)
                .await?
                .ok_or_else(|| AppError::Internal("enrollment conflict without a row".to_string()))?;
            Ok(HttpResponse::Ok().json(json!({
                "message": "Already enrolled",
                "enrollment": existing,
            })))
        }
    }
}

async fn own_enrollment(pool: &PgPool, enrollment_id: Uuid, user_id: Uuid) -> AppResult<Enrollment> {
    let enrollment = db::enrollments::get_enrollment(pool, enrollment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Enrollment"))?;
    if enrollment.user_id != user_id {
        return Err(AppError::forbidden("Unauthorized"));
    }
    Ok(enrollment)
}

#[put("/enrollments/{enrollment_id}")]
pub async fn update_enrollment(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateEnrollmentRequest>,
) -> AppResult<HttpResponse> {
    let mut enrollment = own_enrollment(pool.get_ref(), path.into_inner(), user.id).await?;
    req.into_inner().apply(&mut enrollment, Utc::now());
    db::enrollments::update_enrollment(pool.get_ref(), &enrollment).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Enrollment updated successfully",
        "enrollment": enrollment,
    })))
}

#[delete("/enrollments/{enrollment_id}")]
pub async fn delete_enrollment(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let enrollment = own_enrollment(pool.get_ref(), path.into_inner(), user.id).await?;
    db::enrollments::delete_enrollment(pool.get_ref(), enrollment.id).await?;

    tracing::info!("User {} unenrolled from {}", user.id, enrollment.content_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Unenrolled successfully" })))
}
