// src/auth/guards.rs
//! Request extractors that authenticate the caller and enforce roles before
//! a handler body runs.
use super::tokens::{TokenKind, TokenService};
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::{Content, User};
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use sqlx::PgPool;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use uuid::Uuid;

type LocalBoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;

fn bearer_token(req: &HttpRequest) -> AppResult<Option<&str>> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim()))
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))
}

fn verify(req: &HttpRequest, token: &str, kind: TokenKind) -> AppResult<Uuid> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::Internal("token service not configured".to_string()))?;
    tokens.verify(token, kind).map_err(|e| {
        tracing::debug!("Rejected {:?} token: {}", kind, e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })
}

fn authenticate(req: &HttpRequest, kind: TokenKind) -> AppResult<Uuid> {
    let token = bearer_token(req)?
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?;
    verify(req, token, kind)
}

/// Caller identity from a valid access token. Does not touch the database.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req, TokenKind::Access).map(|user_id| AuthUser { user_id }))
    }
}

/// Caller identity from a valid refresh token.
#[derive(Clone, Copy, Debug)]
pub struct RefreshAuth {
    pub user_id: Uuid,
}

impl FromRequest for RefreshAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req, TokenKind::Refresh).map(|user_id| RefreshAuth { user_id }))
    }
}

/// Anonymous callers are allowed; a supplied but invalid token is still rejected.
#[derive(Clone, Copy, Debug)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequest for MaybeAuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = bearer_token(req).and_then(|token| match token {
            Some(token) => verify(req, token, TokenKind::Access)
                .map(|user_id| MaybeAuthUser(Some(AuthUser { user_id }))),
            None => Ok(MaybeAuthUser(None)),
        });
        ready(result)
    }
}

/// Loads the caller's row on every request so role and activation changes
/// apply immediately.
async fn load_active_user(req: HttpRequest) -> AppResult<User> {
    let user_id = authenticate(&req, TokenKind::Access)?;
    let pool = req
        .app_data::<web::Data<PgPool>>()
        .ok_or_else(|| AppError::Internal("database pool not configured".to_string()))?;
    let user = db::users::get_user_by_id(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }
    Ok(user)
}

/// Any authenticated, active user.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { load_active_user(req).await.map(CurrentUser) })
    }
}

/// Instructor or admin.
#[derive(Clone, Debug)]
pub struct InstructorUser(pub User);

impl FromRequest for InstructorUser {
    type Error = AppError;
    type Future = LocalBoxFuture<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = load_active_user(req).await?;
            instructor_required(&user)?;
            Ok(InstructorUser(user))
        })
    }
}

/// Admin only.
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = load_active_user(req).await?;
            admin_required(&user)?;
            Ok(AdminUser(user))
        })
    }
}

pub fn admin_required(user: &User) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Admin access required"))
    }
}

pub fn instructor_required(user: &User) -> AppResult<()> {
    if user.role.can_author() {
        Ok(())
    } else {
        Err(AppError::forbidden("Instructor access required"))
    }
}

/// Only the owning instructor or an admin may change a content item.
pub fn ensure_can_manage(user: &User, content: &Content) -> AppResult<()> {
    if user.is_admin() || content.is_owned_by(user.id) {
        Ok(())
    } else {
        Err(AppError::forbidden("Unauthorized"))
    }
}

pub fn ensure_self_or_admin(user: &User, target: Uuid) -> AppResult<()> {
    if user.is_admin() || user.id == target {
        Ok(())
    } else {
        Err(AppError::forbidden("Unauthorized"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::models::user::tests::sample_user;
    use actix_web::test::TestRequest;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

    fn tokens() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(15), Duration::days(7))
    }

    fn content_owned_by(owner: Uuid) -> Content {
        let (content, _) = crate::models::CreateContentRequest {
            title: "T".into(),
            description: "D".into(),
            content_type: "video".into(),
            content_url: None,
            thumbnail_url: None,
            duration_minutes: None,
            difficulty_level: None,
            language: None,
            price: None,
            is_free: None,
            is_published: None,
            category_id: None,
            metadata_json: None,
            tags: None,
        }
        .build(owner)
        .unwrap();
        content
    }

    #[test]
    fn admin_predicate() {
        assert!(admin_required(&sample_user(UserRole::Admin)).is_ok());
        assert!(admin_required(&sample_user(UserRole::Instructor)).is_err());
        assert!(admin_required(&sample_user(UserRole::Student)).is_err());
    }

    #[test]
    fn instructor_predicate_admits_admins() {
        assert!(instructor_required(&sample_user(UserRole::Admin)).is_ok());
        assert!(instructor_required(&sample_user(UserRole::Instructor)).is_ok());
        assert!(matches!(
            instructor_required(&sample_user(UserRole::Student)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn only_owner_or_admin_manages_content() {
        let owner = sample_user(UserRole::Instructor);
        let other_instructor = sample_user(UserRole::Instructor);
        let admin = sample_user(UserRole::Admin);
        let content = content_owned_by(owner.id);

        assert!(ensure_can_manage(&owner, &content).is_ok());
        assert!(ensure_can_manage(&admin, &content).is_ok());
        assert!(matches!(
            ensure_can_manage(&other_instructor, &content),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn self_or_admin() {
        let user = sample_user(UserRole::Student);
        assert!(ensure_self_or_admin(&user, user.id).is_ok());
        assert!(ensure_self_or_admin(&user, Uuid::new_v4()).is_err());
        assert!(ensure_self_or_admin(&sample_user(UserRole::Admin), user.id).is_ok());
    }

    #[actix_web::test]
    async fn auth_user_reads_bearer_token() {
        let user_id = Uuid::new_v4();
        let token = tokens().issue(user_id, TokenKind::Access).unwrap();
        let req = TestRequest::default()
            .app_data(web::Data::new(tokens()))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        let auth = AuthUser::extract(&req).await.unwrap();
        assert_eq!(auth.user_id, user_id);
    }

    #[actix_web::test]
    async fn auth_user_requires_header() {
        let req = TestRequest::default()
            .app_data(web::Data::new(tokens()))
            .to_http_request();
        assert!(matches!(
            AuthUser::extract(&req).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_web::test]
    async fn auth_user_rejects_non_bearer_scheme() {
        let req = TestRequest::default()
            .app_data(web::Data::new(tokens()))
            .insert_header((header::AUTHORIZATION, "Basic YWxpY2U6cHc="))
            .to_http_request();
        assert!(AuthUser::extract(&req).await.is_err());
    }

    #[actix_web::test]
    async fn maybe_auth_allows_anonymous_but_not_bad_tokens() {
        let anonymous = TestRequest::default()
            .app_data(web::Data::new(tokens()))
            .to_http_request();
        assert!(MaybeAuthUser::extract(&anonymous).await.unwrap().0.is_none());

        let bad = TestRequest::default()
            .app_data(web::Data::new(tokens()))
            .insert_header((header::AUTHORIZATION, "Bearer nope"))
            .to_http_request();
        assert!(MaybeAuthUser::extract(&bad).await.is_err());
    }

    #[actix_web::test]
    async fn refresh_auth_requires_refresh_token() {
        let pair = tokens().issue_pair(Uuid::new_v4()).unwrap();
        let with_access = TestRequest::default()
            .app_data(web::Data::new(tokens()))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", pair.access_token)))
            .to_http_request();
        assert!(RefreshAuth::extract(&with_access).await.is_err());

        let with_refresh = TestRequest::default()
            .app_data(web::Data::new(tokens()))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", pair.refresh_token)))
            .to_http_request();
        assert!(RefreshAuth::extract(&with_refresh).await.is_ok());
    }
}
