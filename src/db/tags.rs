// src/db/tags.rs
use crate::models::{Tag, tag_slug};
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

/// Returns the tag named `name`, creating it on first use. `name` must
/// already be normalized.
pub async fn get_or_create_tag(db: impl PgExecutor<'_>, name: &str) -> Result<Tag, sqlx::Error> {
    sqlx::query_as::<_, Tag>(
        "INSERT INTO tags (id, name, slug) VALUES ($1, $2, $3) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id, name, slug, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(tag_slug(name))
    .fetch_one(db)
    .await
}

/// Replaces the tag set of a content item. Detached tags stay in `tags`.
pub async fn replace_content_tags(
    conn: &mut PgConnection,
    content_id: Uuid,
    names: &[String],
) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query("DELETE FROM content_tags WHERE content_id = $1")
        .bind(content_id)
        .execute(&mut *conn)
        .await?;

    let mut attached = Vec::with_capacity(names.len());
    for (position, name) in names.iter().enumerate() {
        let tag = get_or_create_tag(&mut *conn, name).await?;
        sqlx::query("INSERT INTO content_tags (content_id, tag_id, position) VALUES ($1, $2, $3)")
            .bind(content_id)
            .bind(tag.id)
            .bind(position as i32)
            .execute(&mut *conn)
            .await?;
        attached.push(tag);
    }
    Ok(attached)
}
