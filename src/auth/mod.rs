// src/auth/mod.rs
pub mod guards;
pub mod password;
pub mod tokens;

use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::{LoginRequest, RegisterRequest, User, UserResponse, UserRole};
use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use guards::{AuthUser, RefreshAuth};
use password::{hash_password, verify_password};
use serde_json::json;
use sqlx::PgPool;
use tokens::{TokenKind, TokenService};
use uuid::Uuid;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register);
    cfg.service(login);
    cfg.service(refresh);
    cfg.service(me);
}

fn token_failure(e: tokens::TokenError) -> AppError {
    AppError::Internal(format!("token generation failed: {}", e))
}

#[post("/auth/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    req: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = req.into_inner().normalized();
    req.validate().map_err(AppError::BadRequest)?;

    if db::users::username_exists(pool.get_ref(), &req.username).await? {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }
    if db::users::email_exists(pool.get_ref(), &req.email).await? {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(req.password).await?;
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: req.username,
        email: req.email,
        password_hash,
        full_name: req.full_name,
        role: UserRole::for_registration(req.role.as_deref()),
        bio: None,
        avatar_url: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    // A concurrent registration still surfaces as 409 through the unique constraints.
    db::users::create_user(pool.get_ref(), &user).await?;

    let pair = tokens.issue_pair(user.id).map_err(token_failure)?;
    tracing::info!("Registered user {} ({:?})", user.id, user.role);

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "user": UserResponse::private(&user),
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
    })))
}

#[post("/auth/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    req: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let req = req.into_inner();
    let user = db::users::get_user_by_username(pool.get_ref(), req.username.trim())
        .await?
        .ok_or_else(invalid)?;

    match verify_password(req.password, user.password_hash.clone()).await {
        Ok(true) => {}
        Ok(false) => return Err(invalid()),
        Err(e) => {
            tracing::warn!("Password verification failed for {}: {}", user.id, e);
            return Err(invalid());
        }
    }
    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    let pair = tokens.issue_pair(user.id).map_err(token_failure)?;
    tracing::info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "user": UserResponse::private(&user),
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
    })))
}

#[post("/auth/refresh")]
pub async fn refresh(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    auth: RefreshAuth,
) -> AppResult<HttpResponse> {
    let user = db::users::get_user_by_id(pool.get_ref(), auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    let access_token = tokens
        .issue(user.id, TokenKind::Access)
        .map_err(token_failure)?;
    Ok(HttpResponse::Ok().json(json!({ "access_token": access_token })))
}

#[get("/auth/me")]
pub async fn me(pool: web::Data<PgPool>, auth: AuthUser) -> AppResult<HttpResponse> {
    let user = db::users::get_user_by_id(pool.get_ref(), auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(HttpResponse::Ok().json(json!({ "user": UserResponse::private(&user) })))
}
