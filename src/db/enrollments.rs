// src/db/enrollments.rs
use crate::models::{Enrollment, Pagination};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const ENROLLMENT_COLUMNS: &str =
    "id, user_id, content_id, enrolled_at, completed_at, is_completed, last_accessed_at";

pub async fn get_enrollment(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_enrollment(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    content_id: Uuid,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = $1 AND content_id = $2"
    ))
    .bind(user_id)
    .bind(content_id)
    .fetch_optional(db)
    .await
}

pub async fn is_enrolled(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    content_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = $1 AND content_id = $2)",
    )
    .bind(user_id)
    .bind(content_id)
    .fetch_one(db)
    .await
}

/// Inserts the enrollment unless the (user, content) pair already has one.
/// Returns `None` when a row already existed.
pub async fn insert_if_absent(
    db: impl PgExecutor<'_>,
    enrollment: &Enrollment,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments ({ENROLLMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT ON CONSTRAINT unique_user_content DO NOTHING \
         RETURNING {ENROLLMENT_COLUMNS}"
    ))
    .bind(enrollment.id)
    .bind(enrollment.user_id)
    .bind(enrollment.content_id)
    .bind(enrollment.enrolled_at)
    .bind(enrollment.completed_at)
    .bind(enrollment.is_completed)
    .bind(enrollment.last_accessed_at)
    .fetch_optional(db)
    .await
}

pub async fn update_enrollment(db: impl PgExecutor<'_>, enrollment: &Enrollment) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE enrollments SET completed_at = $2, is_completed = $3, last_accessed_at = $4 \
         WHERE id = $1",
    )
    .bind(enrollment.id)
    .bind(enrollment.completed_at)
    .bind(enrollment.is_completed)
    .bind(enrollment.last_accessed_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_enrollment(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    is_completed: Option<bool>,
    page: Pagination,
) -> Result<(Vec<Enrollment>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM enrollments WHERE user_id = ");
    count.push_bind(user_id);
    let mut select = QueryBuilder::<Postgres>::new(format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = "
    ));
    select.push_bind(user_id);

    if let Some(done) = is_completed {
        count.push(" AND is_completed = ").push_bind(done);
        select.push(" AND is_completed = ").push_bind(done);
    }
    select
        .push(" ORDER BY enrolled_at DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    let items = select.build_query_as::<Enrollment>().fetch_all(pool).await?;
    Ok((items, total))
}
