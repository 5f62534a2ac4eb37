// src/routes/users.rs
use crate::auth::guards::{AdminUser, CurrentUser, ensure_self_or_admin};
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::{Pagination, UpdateUserRequest, UserListQuery, UserResponse};
use actix_web::{HttpResponse, delete, get, put, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users);
    cfg.service(get_user);
    cfg.service(update_user);
    cfg.service(delete_user);
}

#[get("/users")]
pub async fn list_users(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<UserListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = Pagination::new(query.page, query.per_page);
    let (users, total) = db::users::list_users(pool.get_ref(), query.role, page).await?;
    let users: Vec<UserResponse> = users.iter().map(UserResponse::private).collect();

    Ok(HttpResponse::Ok().json(json!({
        "users": users,
        "pagination": page.meta(total),
    })))
}

#[get("/users/{user_id}")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    CurrentUser(caller): CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let user = db::users::get_user_by_id(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let profile = if caller.id == user.id || caller.is_admin() {
        UserResponse::private(&user)
    } else {
        UserResponse::public(&user)
    };
    Ok(HttpResponse::Ok().json(json!({ "user": profile })))
}

#[put("/users/{user_id}")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    CurrentUser(caller): CurrentUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    ensure_self_or_admin(&caller, user_id)?;

    let req = req.into_inner();
    if req.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }
    if req.touches_privileged_fields() && !caller.is_admin() {
        return Err(AppError::forbidden("Only admins can change role or status"));
    }

    let mut user = db::users::get_user_by_id(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    req.apply(&mut user).map_err(AppError::BadRequest)?;
    let user = db::users::update_user(pool.get_ref(), &user).await?;

    tracing::info!("User {} updated by {}", user.id, caller.id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "User updated successfully",
        "user": UserResponse::private(&user),
    })))
}

#[derive(Deserialize, Debug)]
pub struct DeleteUserQuery {
    pub reassign_to: Option<Uuid>,
}

#[delete("/users/{user_id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    AdminUser(admin): AdminUser,
    path: web::Path<Uuid>,
    query: web::Query<DeleteUserQuery>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    if user_id == admin.id {
        return Err(AppError::bad_request("Admins cannot delete their own account"));
    }

    let mut tx = pool.begin().await?;
    if db::users::get_user_by_id(&mut *tx, user_id).await?.is_none() {
        return Err(AppError::not_found("User"));
    }

    let authored = db::users::count_authored_content(&mut *tx, user_id).await?;
    if authored > 0 {
        let Some(target_id) = query.reassign_to else {
            return Err(AppError::Conflict(format!(
                "User authored {} content item(s); pass reassign_to to transfer them",
                authored
            )));
        };
        if target_id == user_id {
            return Err(AppError::bad_request("Cannot reassign content to the deleted user"));
        }
        let target = db::users::get_user_by_id(&mut *tx, target_id)
            .await?
            .ok_or_else(|| AppError::bad_request("Reassignment target does not exist"))?;
        if !target.role.can_author() {
            return Err(AppError::bad_request(
                "Reassignment target must be an instructor or admin",
            ));
        }
        let moved = db::users::reassign_content(&mut *tx, user_id, target_id).await?;
        tracing::info!("Reassigned {} content item(s) from {} to {}", moved, user_id, target_id);
    }

    // Reviews cascade with the user; their content aggregates must follow.
    let reviewed = db::reviews::reviewed_content_ids(&mut *tx, user_id).await?;
    for content_id in &reviewed {
        db::content::lock_content(&mut *tx, *content_id).await?;
    }
    db::users::delete_user(&mut *tx, user_id).await?;
    for content_id in &reviewed {
        db::content::recompute_rating(&mut *tx, *content_id).await?;
    }
    tx.commit().await?;

    tracing::info!("User {} deleted by admin {}", user_id, admin.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}
