// src/db/reviews.rs
use crate::models::{Pagination, Review, ReviewRecord, ReviewSort};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const REVIEW_COLUMNS: &str = "id, user_id, content_id, rating, title, comment, \
     is_verified_purchase, helpful_count, created_at, updated_at";

const REVIEW_RECORD_SELECT: &str = r#"
SELECT r.id, r.user_id, r.content_id, r.rating, r.title, r.comment,
       r.is_verified_purchase, r.helpful_count, r.created_at, r.updated_at,
       u.username, u.full_name, u.avatar_url
FROM reviews r
JOIN users u ON u.id = r.user_id
"#;

pub async fn get_review(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn get_review_record(
    db: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<ReviewRecord>, sqlx::Error> {
    sqlx::query_as::<_, ReviewRecord>(&format!("{REVIEW_RECORD_SELECT} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn review_exists(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    content_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND content_id = $2)")
        .bind(user_id)
        .bind(content_id)
        .fetch_one(db)
        .await
}

pub async fn insert_review(db: impl PgExecutor<'_>, review: &Review) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO reviews ({REVIEW_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
    ))
    .bind(review.id)
    .bind(review.user_id)
    .bind(review.content_id)
    .bind(review.rating)
    .bind(&review.title)
    .bind(&review.comment)
    .bind(review.is_verified_purchase)
    .bind(review.helpful_count)
    .bind(review.created_at)
    .bind(review.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_review(db: impl PgExecutor<'_>, review: &Review) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE reviews SET rating = $2, title = $3, comment = $4, updated_at = $5 WHERE id = $1")
        .bind(review.id)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.comment)
        .bind(review.updated_at)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_review(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn increment_helpful(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE reviews SET helpful_count = helpful_count + 1 WHERE id = $1 RETURNING helpful_count",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Content items the user has reviewed, in a stable order for row locking.
pub async fn reviewed_content_ids(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT DISTINCT content_id FROM reviews WHERE user_id = $1 ORDER BY content_id",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn list_for_content(
    pool: &PgPool,
    content_id: Uuid,
    sort: ReviewSort,
    page: Pagination,
) -> Result<(Vec<ReviewRecord>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE content_id = $1")
        .bind(content_id)
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, ReviewRecord>(&format!(
        "{REVIEW_RECORD_SELECT} WHERE r.content_id = $1{} LIMIT $2 OFFSET $3",
        sort.order_clause()
    ))
    .bind(content_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((items, total))
}
