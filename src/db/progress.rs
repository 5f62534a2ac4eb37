// src/db/progress.rs
use crate::models::{Pagination, Progress};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const PROGRESS_COLUMNS: &str =
    "id, user_id, content_id, completion_percentage, last_position, notes, bookmarked, updated_at";

/// Fields written by an upsert; `None` leaves an existing value unchanged.
#[derive(Clone, Debug, Default)]
pub struct ProgressPatch {
    pub completion_percentage: Option<f64>,
    pub last_position: Option<i32>,
    pub notes: Option<String>,
    pub bookmarked: Option<bool>,
}

pub async fn find_progress(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    content_id: Uuid,
) -> Result<Option<Progress>, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM progress WHERE user_id = $1 AND content_id = $2"
    ))
    .bind(user_id)
    .bind(content_id)
    .fetch_optional(db)
    .await
}

/// Creates the record with defaults for missing fields, or patches only the
/// supplied fields of the existing one.
pub async fn upsert_progress(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    content_id: Uuid,
    patch: &ProgressPatch,
) -> Result<Progress, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        r#"
        INSERT INTO progress (id, user_id, content_id, completion_percentage, last_position, notes, bookmarked, updated_at)
        VALUES ($1, $2, $3, COALESCE($4, 0), $5, $6, COALESCE($7, FALSE), NOW())
        ON CONFLICT ON CONSTRAINT unique_user_progress DO UPDATE SET
            completion_percentage = COALESCE($4, progress.completion_percentage),
            last_position = COALESCE($5, progress.last_position),
            notes = COALESCE($6, progress.notes),
            bookmarked = COALESCE($7, progress.bookmarked),
            updated_at = NOW()
        RETURNING {PROGRESS_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(content_id)
    .bind(patch.completion_percentage)
    .bind(patch.last_position)
    .bind(&patch.notes)
    .bind(patch.bookmarked)
    .fetch_one(db)
    .await
}

/// Flips `bookmarked`; a missing record is created already bookmarked.
pub async fn toggle_bookmark(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    content_id: Uuid,
) -> Result<Progress, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        r#"
        INSERT INTO progress (id, user_id, content_id, bookmarked, updated_at)
        VALUES ($1, $2, $3, TRUE, NOW())
        ON CONFLICT ON CONSTRAINT unique_user_progress DO UPDATE SET
            bookmarked = NOT progress.bookmarked,
            updated_at = NOW()
        RETURNING {PROGRESS_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(content_id)
    .fetch_one(db)
    .await
}

pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    bookmarked_only: bool,
    page: Pagination,
) -> Result<(Vec<Progress>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM progress WHERE user_id = $1 AND ($2 = FALSE OR bookmarked)",
    )
    .bind(user_id)
    .bind(bookmarked_only)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, Progress>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM progress WHERE user_id = $1 AND ($2 = FALSE OR bookmarked) \
         ORDER BY updated_at DESC LIMIT $3 OFFSET $4"
    ))
    .bind(user_id)
    .bind(bookmarked_only)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((items, total))
}
