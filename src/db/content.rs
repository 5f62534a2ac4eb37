// src/db/content.rs
use crate::models::{Content, ContentRecord, ContentSort, ContentType, Pagination};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const CONTENT_COLUMNS: &str = "id, title, description, content_type, content_url, thumbnail_url, \
     duration_minutes, difficulty_level, language, price, is_free, is_published, view_count, \
     rating_average, rating_count, instructor_id, category_id, metadata_json, created_at, updated_at";

/// Content joined with instructor, category and ordered tag names. Callers
/// append `WHERE` / `ORDER BY` clauses against the `c` alias.
pub(crate) const CONTENT_RECORD_SELECT: &str = r#"
SELECT c.id, c.title, c.description, c.content_type, c.content_url, c.thumbnail_url,
       c.duration_minutes, c.difficulty_level, c.language, c.price, c.is_free,
       c.is_published, c.view_count, c.rating_average, c.rating_count,
       c.instructor_id, c.category_id, c.metadata_json, c.created_at, c.updated_at,
       u.username AS instructor_username,
       u.full_name AS instructor_full_name,
       cat.name AS category_name,
       ARRAY(
           SELECT t.name FROM content_tags ct
           JOIN tags t ON t.id = ct.tag_id
           WHERE ct.content_id = c.id
           ORDER BY ct.position
       ) AS tags
FROM content c
JOIN users u ON u.id = c.instructor_id
LEFT JOIN categories cat ON cat.id = c.category_id
"#;

/// Browse filters; every field narrows the published catalog.
#[derive(Clone, Debug, Default)]
pub struct ContentFilter {
    pub content_type: Option<ContentType>,
    pub category_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub is_free: Option<bool>,
    pub difficulty: Option<String>,
    pub language: Option<String>,
}

impl ContentFilter {
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE c.is_published = TRUE");
        if let Some(content_type) = self.content_type {
            qb.push(" AND c.content_type = ").push_bind(content_type);
        }
        if let Some(category_id) = self.category_id {
            qb.push(" AND c.category_id = ").push_bind(category_id);
        }
        if let Some(instructor_id) = self.instructor_id {
            qb.push(" AND c.instructor_id = ").push_bind(instructor_id);
        }
        if let Some(is_free) = self.is_free {
            qb.push(" AND c.is_free = ").push_bind(is_free);
        }
        if let Some(difficulty) = &self.difficulty {
            qb.push(" AND c.difficulty_level = ").push_bind(difficulty.clone());
        }
        if let Some(language) = &self.language {
            qb.push(" AND c.language = ").push_bind(language.clone());
        }
    }
}

pub async fn get_content(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Content>, sqlx::Error> {
    sqlx::query_as::<_, Content>(&format!(
        "SELECT {CONTENT_COLUMNS} FROM content WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Takes a row lock on the content item for the rest of the transaction.
pub async fn lock_content(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Content>, sqlx::Error> {
    sqlx::query_as::<_, Content>(&format!(
        "SELECT {CONTENT_COLUMNS} FROM content WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn get_content_record(
    db: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<ContentRecord>, sqlx::Error> {
    sqlx::query_as::<_, ContentRecord>(&format!("{CONTENT_RECORD_SELECT} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_content(db: impl PgExecutor<'_>, content: &Content) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO content ({CONTENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
         $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)"
    ))
    .bind(content.id)
    .bind(&content.title)
    .bind(&content.description)
    .bind(content.content_type)
    .bind(&content.content_url)
    .bind(&content.thumbnail_url)
    .bind(content.duration_minutes)
    .bind(&content.difficulty_level)
    .bind(&content.language)
    .bind(content.price)
    .bind(content.is_free)
    .bind(content.is_published)
    .bind(content.view_count)
    .bind(content.rating_average)
    .bind(content.rating_count)
    .bind(content.instructor_id)
    .bind(content.category_id)
    .bind(&content.metadata_json)
    .bind(content.created_at)
    .bind(content.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Writes the owner-editable columns. Counters and the rating aggregate are
/// left untouched.
pub async fn update_content(db: impl PgExecutor<'_>, content: &Content) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE content SET title = $2, description = $3, content_url = $4, thumbnail_url = $5, \
         duration_minutes = $6, difficulty_level = $7, language = $8, price = $9, is_free = $10, \
         is_published = $11, category_id = $12, metadata_json = $13, updated_at = $14 \
         WHERE id = $1",
    )
    .bind(content.id)
    .bind(&content.title)
    .bind(&content.description)
    .bind(&content.content_url)
    .bind(&content.thumbnail_url)
    .bind(content.duration_minutes)
    .bind(&content.difficulty_level)
    .bind(&content.language)
    .bind(content.price)
    .bind(content.is_free)
    .bind(content.is_published)
    .bind(content.category_id)
    .bind(&content.metadata_json)
    .bind(content.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_content(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM content WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn increment_view_count(db: impl PgExecutor<'_>, id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("UPDATE content SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count")
        .bind(id)
        .fetch_one(db)
        .await
}

/// Recomputes `rating_average` / `rating_count` from every review of the item.
pub async fn recompute_rating(db: impl PgExecutor<'_>, content_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE content SET
            rating_average = COALESCE(
                (SELECT ROUND(AVG(rating)::numeric, 2)::float8 FROM reviews WHERE content_id = $1),
                0
            ),
            rating_count = (SELECT COUNT(*) FROM reviews WHERE content_id = $1)
        WHERE id = $1
        "#,
    )
    .bind(content_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn list_published(
    pool: &PgPool,
    filter: &ContentFilter,
    sort: ContentSort,
    page: Pagination,
) -> Result<(Vec<ContentRecord>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM content c");
    filter.push_conditions(&mut count);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Postgres>::new(CONTENT_RECORD_SELECT);
    filter.push_conditions(&mut select);
    select
        .push(sort.order_clause())
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let items = select.build_query_as::<ContentRecord>().fetch_all(pool).await?;

    Ok((items, total))
}
