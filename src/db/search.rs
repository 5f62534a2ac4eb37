// src/db/search.rs
use super::content::CONTENT_RECORD_SELECT;
use super::like_pattern;
use crate::models::{ContentRecord, ContentType, Pagination};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Serialize, Debug, Clone, FromRow)]
pub struct Suggestion {
    pub id: Uuid,
    pub title: String,
    pub content_type: ContentType,
    pub thumbnail_url: Option<String>,
}

fn push_search_conditions(qb: &mut QueryBuilder<'_, Postgres>, text: Option<&str>, tags: &[String]) {
    qb.push(" WHERE c.is_published = TRUE");
    if let Some(text) = text {
        let pattern = like_pattern(text);
        qb.push(" AND (c.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if !tags.is_empty() {
        qb.push(
            " AND c.id IN (SELECT ct.content_id FROM content_tags ct \
             JOIN tags t ON t.id = ct.tag_id WHERE t.name = ANY(",
        )
        .push_bind(tags.to_vec())
        .push(") GROUP BY ct.content_id HAVING COUNT(DISTINCT t.id) = ")
        .push_bind(tags.len() as i64)
        .push(")");
    }
}

/// Published content matching `text` in title or description and carrying
/// every tag in `tags`, best rated first.
pub async fn search_content(
    pool: &PgPool,
    text: Option<&str>,
    tags: &[String],
    page: Pagination,
) -> Result<(Vec<ContentRecord>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM content c");
    push_search_conditions(&mut count, text, tags);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Postgres>::new(CONTENT_RECORD_SELECT);
    push_search_conditions(&mut select, text, tags);
    select
        .push(" ORDER BY c.rating_average DESC, c.view_count DESC, c.created_at DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let items = select.build_query_as::<ContentRecord>().fetch_all(pool).await?;

    Ok((items, total))
}

pub async fn title_suggestions(
    pool: &PgPool,
    text: &str,
    limit: i64,
) -> Result<Vec<Suggestion>, sqlx::Error> {
    sqlx::query_as::<_, Suggestion>(
        "SELECT id, title, content_type, thumbnail_url FROM content \
         WHERE is_published = TRUE AND title ILIKE $1 \
         ORDER BY rating_average DESC, view_count DESC LIMIT $2",
    )
    .bind(like_pattern(text))
    .bind(limit)
    .fetch_all(pool)
    .await
}
