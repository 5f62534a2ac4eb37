// src/routes/content.rs
use crate::auth::guards::{InstructorUser, MaybeAuthUser, ensure_can_manage};
use crate::db;
use crate::db::content::ContentFilter;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Content, ContentListQuery, ContentResponse, ContentSort, ContentType, CreateContentRequest,
    Pagination, UpdateContentRequest,
};
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_content);
    cfg.service(get_content_by_id);
    cfg.service(create_content);
    cfg.service(update_content);
    cfg.service(delete_content);
}

fn filter_from_query(query: &ContentListQuery) -> AppResult<ContentFilter> {
    let content_type = match query.content_type.as_deref() {
        Some(value) => Some(
            ContentType::parse(value).ok_or_else(|| AppError::bad_request("Invalid content type"))?,
        ),
        None => None,
    };
    Ok(ContentFilter {
        content_type,
        category_id: query.category_id,
        instructor_id: query.instructor_id,
        is_free: query.is_free,
        difficulty: query.difficulty.clone(),
        language: query.language.clone(),
    })
}

#[get("/content")]
pub async fn list_content(
    pool: web::Data<PgPool>,
    query: web::Query<ContentListQuery>,
) -> AppResult<HttpResponse> {
    let filter = filter_from_query(&query)?;
    let sort = ContentSort::parse(query.sort_by.as_deref());
    let page = Pagination::new(query.page, query.per_page);

    let (records, total) = db::content::list_published(pool.get_ref(), &filter, sort, page).await?;
    let content: Vec<ContentResponse> = records.into_iter().map(ContentResponse::summary).collect();

    Ok(HttpResponse::Ok().json(json!({
        "content": content,
        "pagination": page.meta(total),
    })))
}

/// Drafts are only visible to their owner and to admins.
async fn can_view(pool: &PgPool, content: &Content, viewer: Option<Uuid>) -> AppResult<bool> {
    if content.is_published {
        return Ok(true);
    }
    let Some(viewer) = viewer else {
        return Ok(false);
    };
    if content.is_owned_by(viewer) {
        return Ok(true);
    }
    let user = db::users::get_user_by_id(pool, viewer).await?;
    Ok(user.is_some_and(|u| u.is_active && u.is_admin()))
}

#[get("/content/{content_id}")]
pub async fn get_content_by_id(
    pool: web::Data<PgPool>,
    auth: MaybeAuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let content_id = path.into_inner();
    let content = db::content::get_content(pool.get_ref(), content_id)
        .await?
        .ok_or_else(|| AppError::not_found("Content"))?;
    if !can_view(pool.get_ref(), &content, auth.0.map(|a| a.user_id)).await? {
        return Err(AppError::not_found("Content"));
    }

    db::content::increment_view_count(pool.get_ref(), content_id).await?;
    let record = db::content::get_content_record(pool.get_ref(), content_id)
        .await?
        .ok_or_else(|| AppError::not_found("Content"))?;

    Ok(HttpResponse::Ok().json(ContentResponse::detailed(record)))
}

#[post("/content")]
pub async fn create_content(
    pool: web::Data<PgPool>,
    InstructorUser(user): InstructorUser,
    req: web::Json<CreateContentRequest>,
) -> AppResult<HttpResponse> {
    let (content, tags) = req.into_inner().build(user.id).map_err(AppError::BadRequest)?;

    let mut tx = pool.begin().await?;
    db::content::insert_content(&mut *tx, &content).await?;
    if !tags.is_empty() {
        db::tags::replace_content_tags(&mut *tx, content.id, &tags).await?;
    }
    let record = db::content::get_content_record(&mut *tx, content.id)
        .await?
        .ok_or_else(|| AppError::Internal("created content vanished".to_string()))?;
    tx.commit().await?;

    tracing::info!("Content {} created by {}", content.id, user.id);
    Ok(HttpResponse::Created().json(json!({
        "message": "Content created successfully",
        "content": ContentResponse::detailed(record),
    })))
}

#[put("/content/{content_id}")]
pub async fn update_content(
    pool: web::Data<PgPool>,
    InstructorUser(user): InstructorUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateContentRequest>,
) -> AppResult<HttpResponse> {
    let content_id = path.into_inner();

    let mut tx = pool.begin().await?;
    let mut content = db::content::lock_content(&mut *tx, content_id)
        .await?
        .ok_or_else(|| AppError::not_found("Content"))?;
    ensure_can_manage(&user, &content)?;

    let tags = req.into_inner().apply(&mut content).map_err(AppError::BadRequest)?;
    db::content::update_content(&mut *tx, &content).await?;
    if let Some(tags) = tags {
        db::tags::replace_content_tags(&mut *tx, content.id, &tags).await?;
    }
    let record = db::content::get_content_record(&mut *tx, content.id)
        .await?
        .ok_or_else(|| AppError::not_found("Content"))?;
    tx.commit().await?;

    tracing::info!("Content {} updated by {}", content.id, user.id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Content updated successfully",
        "content": ContentResponse::detailed(record),
    })))
}

#[delete("/content/{content_id}")]
pub async fn delete_content(
    pool: web::Data<PgPool>,
    InstructorUser(user): InstructorUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let content_id = path.into_inner();
    let content = db::content::get_content(pool.get_ref(), content_id)
        .await?
        .ok_or_else(|| AppError::not_found("Content"))?;
    ensure_can_manage(&user, &content)?;

    db::content::delete_content(pool.get_ref(), content_id).await?;
    tracing::info!("Content {} deleted by {}", content_id, user.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Content deleted successfully" })))
}
