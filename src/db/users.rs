// src/db/users.rs
use crate::models::{Pagination, User, UserRole};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, role, bio, avatar_url, \
     is_active, created_at, updated_at";

pub async fn get_user_by_id(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn get_user_by_username(
    db: impl PgExecutor<'_>,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(db)
    .await
}

pub async fn username_exists(db: impl PgExecutor<'_>, username: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(db)
        .await
}

pub async fn email_exists(db: impl PgExecutor<'_>, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(db)
        .await
}

pub async fn create_user(db: impl PgExecutor<'_>, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, full_name, role, bio, avatar_url, \
         is_active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.full_name)
    .bind(user.role)
    .bind(&user.bio)
    .bind(&user.avatar_url)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_user(db: impl PgExecutor<'_>, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET full_name = $2, bio = $3, avatar_url = $4, role = $5, is_active = $6, \
         updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(user.id)
    .bind(&user.full_name)
    .bind(&user.bio)
    .bind(&user.avatar_url)
    .bind(user.role)
    .bind(user.is_active)
    .fetch_one(db)
    .await
}

pub async fn list_users(
    pool: &PgPool,
    role: Option<UserRole>,
    page: Pagination,
) -> Result<(Vec<User>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
    let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
    if let Some(role) = role {
        count.push(" WHERE role = ").push_bind(role);
        select.push(" WHERE role = ").push_bind(role);
    }
    select
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    let users = select.build_query_as::<User>().fetch_all(pool).await?;
    Ok((users, total))
}

pub async fn count_authored_content(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM content WHERE instructor_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await
}

pub async fn reassign_content(
    db: impl PgExecutor<'_>,
    from: Uuid,
    to: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE content SET instructor_id = $2, updated_at = NOW() WHERE instructor_id = $1",
    )
    .bind(from)
    .bind(to)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_user(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
