// src/routes/categories.rs
use crate::auth::guards::AdminUser;
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::{CreateCategoryRequest, UpdateCategoryRequest};
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_categories);
    cfg.service(get_category);
    cfg.service(create_category);
    cfg.service(update_category);
    cfg.service(delete_category);
}

#[get("/categories")]
pub async fn list_categories(pool: web::Data<PgPool>) -> AppResult<HttpResponse> {
    let categories = db::categories::list_categories(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(json!({ "categories": categories })))
}

#[get("/categories/{category_id}")]
pub async fn get_category(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let category = db::categories::get_category(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    Ok(HttpResponse::Ok().json(category))
}

#[post("/categories")]
pub async fn create_category(
    pool: web::Data<PgPool>,
    AdminUser(admin): AdminUser,
    req: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = req.into_inner().build().map_err(AppError::BadRequest)?;

    if db::categories::name_taken(pool.get_ref(), &category.name, None).await? {
        return Err(AppError::Conflict("Category already exists".to_string()));
    }
    if db::categories::slug_taken(pool.get_ref(), &category.slug, None).await? {
        return Err(AppError::Conflict("Category slug already exists".to_string()));
    }
    if let Some(parent_id) = category.parent_id {
        if db::categories::get_category(pool.get_ref(), parent_id).await?.is_none() {
            return Err(AppError::bad_request("Parent category does not exist"));
        }
    }

    db::categories::insert_category(pool.get_ref(), &category).await?;
    tracing::info!("Category {} ({}) created by {}", category.id, category.slug, admin.id);
    Ok(HttpResponse::Created().json(json!({
        "message": "Category created successfully",
        "category": category,
    })))
}

#[put("/categories/{category_id}")]
pub async fn update_category(
    pool: web::Data<PgPool>,
    AdminUser(admin): AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let category_id = path.into_inner();
    let req = req.into_inner();

    let mut tx = pool.begin().await?;
    if req.new_parent().is_some() {
        // Two concurrent moves could each pass the cycle check on their own.
        db::categories::lock_for_reparent(&mut *tx).await?;
    }
    let mut category = db::categories::get_category(&mut *tx, category_id)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    if let Some(parent_id) = req.new_parent() {
        if db::categories::get_category(&mut *tx, parent_id).await?.is_none() {
            return Err(AppError::bad_request("Parent category does not exist"));
        }
        if db::categories::is_self_or_descendant(&mut *tx, category_id, parent_id).await? {
            return Err(AppError::bad_request(
                "A category cannot be moved under itself or one of its descendants",
            ));
        }
    }

    req.apply(&mut category).map_err(AppError::BadRequest)?;
    if db::categories::name_taken(&mut *tx, &category.name, Some(category_id)).await? {
        return Err(AppError::Conflict("Category already exists".to_string()));
    }
    if db::categories::slug_taken(&mut *tx, &category.slug, Some(category_id)).await? {
        return Err(AppError::Conflict("Category slug already exists".to_string()));
    }
    db::categories::update_category(&mut *tx, &category).await?;
    tx.commit().await?;

    tracing::info!("Category {} updated by {}", category_id, admin.id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Category updated successfully",
        "category": category,
    })))
}

#[delete("/categories/{category_id}")]
pub async fn delete_category(
    pool: web::Data<PgPool>,
    AdminUser(admin): AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let category_id = path.into_inner();
    if !db::categories::delete_category(pool.get_ref(), category_id).await? {
        return Err(AppError::not_found("Category"));
    }
    tracing::info!("Category {} deleted by {}", category_id, admin.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Category deleted successfully" })))
}
