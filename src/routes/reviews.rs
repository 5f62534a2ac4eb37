// src/routes/reviews.rs
use crate::auth::guards::CurrentUser;
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CreateReviewRequest, Pagination, ReviewListQuery, ReviewResponse, ReviewSort,
    UpdateReviewRequest,
};
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_content_reviews);
    cfg.service(create_review);
    cfg.service(update_review);
    cfg.service(delete_review);
    cfg.service(mark_helpful);
}

#[get("/reviews/content/{content_id}")]
pub async fn list_content_reviews(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    query: web::Query<ReviewListQuery>,
) -> AppResult<HttpResponse> {
    let content_id = path.into_inner();
    let page = Pagination::new(query.page, query.per_page);
    let sort = ReviewSort::parse(query.sort_by.as_deref());

    let (records, total) =
        db::reviews::list_for_content(pool.get_ref(), content_id, sort, page).await?;
    let reviews: Vec<ReviewResponse> = records.into_iter().map(ReviewResponse::from).collect();

    Ok(HttpResponse::Ok().json(json!({
        "reviews": reviews,
        "pagination": page.meta(total),
    })))
}

async fn review_response(conn: &mut PgConnection, review_id: Uuid) -> AppResult<ReviewResponse> {
    db::reviews::get_review_record(conn, review_id)
        .await?
        .map(ReviewResponse::from)
        .ok_or_else(|| AppError::not_found("Review"))
}

#[post("/reviews")]
pub async fn create_review(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    req: web::Json<CreateReviewRequest>,
) -> AppResult<HttpResponse> {
    let req = req.into_inner();
    req.validate().map_err(AppError::BadRequest)?;
    let content_id = req.content_id;

    let mut tx = pool.begin().await?;
    // Serializes rating recomputation per content item.
    let content = db::content::lock_content(&mut *tx, content_id)
        .await?
        .ok_or_else(|| AppError::not_found("Content"))?;
    // Drafts stay invisible to reviewers other than their owner or an admin.
    if !content.is_published && !content.is_owned_by(user.id) && !user.is_admin() {
        return Err(AppError::not_found("Content"));
    }
    if db::reviews::review_exists(&mut *tx, user.id, content_id).await? {
        return Err(AppError::Conflict("Review already exists".to_string()));
    }

    let verified = db::enrollments::is_enrolled(&mut *tx, user.id, content_id).await?;
    let review = req.build(user.id, verified).map_err(AppError::BadRequest)?;
    db::reviews::insert_review(&mut *tx, &review).await?;
    db::content::recompute_rating(&mut *tx, content_id).await?;
    let response = review_response(&mut *tx, review.id).await?;
    tx.commit().await?;

    tracing::info!("Review {} on {} by {}", review.id, content_id, user.id);
    Ok(HttpResponse::Created().json(json!({
        "message": "Review created successfully",
        "review": response,
    })))
}

#[put("/reviews/{review_id}")]
pub async fn update_review(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateReviewRequest>,
) -> AppResult<HttpResponse> {
    let review_id = path.into_inner();
    let req = req.into_inner();
    req.validate().map_err(AppError::BadRequest)?;

    let mut review = db::reviews::get_review(pool.get_ref(), review_id)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;
    if review.user_id != user.id {
        return Err(AppError::forbidden("Unauthorized"));
    }

    let mut tx = pool.begin().await?;
    db::content::lock_content(&mut *tx, review.content_id).await?;
    req.apply(&mut review).map_err(AppError::BadRequest)?;
    db::reviews::update_review(&mut *tx, &review).await?;
    db::content::recompute_rating(&mut *tx, review.content_id).await?;
    let response = review_response(&mut *tx, review.id).await?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Review updated successfully",
        "review": response,
    })))
}

#[delete("/reviews/{review_id}")]
pub async fn delete_review(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let review_id = path.into_inner();
    let review = db::reviews::get_review(pool.get_ref(), review_id)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;
    if review.user_id != user.id {
        return Err(AppError::forbidden("Unauthorized"));
    }

    let mut tx = pool.begin().await?;
    db::content::lock_content(&mut *tx, review.content_id).await?;
    if !db::reviews::delete_review(&mut *tx, review.id).await? {
        return Err(AppError::not_found("Review"));
    }
    db::content::recompute_rating(&mut *tx, review.content_id).await?;
    tx.commit().await?;

    tracing::info!("Review {} deleted by {}", review_id, user.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Review deleted successfully" })))
}

#[post("/reviews/{review_id}/helpful")]
pub async fn mark_helpful(
    pool: web::Data<PgPool>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let helpful_count = db::reviews::increment_helpful(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Review marked as helpful",
        "helpful_count": helpful_count,
    })))
}
