// src/db/categories.rs
use crate::models::Category;
use sqlx::PgExecutor;
use uuid::Uuid;

const CATEGORY_COLUMNS: &str = "id, name, slug, description, icon_url, parent_id, created_at";

pub async fn list_categories(db: impl PgExecutor<'_>) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
    ))
    .fetch_all(db)
    .await
}

pub async fn get_category(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn name_taken(
    db: impl PgExecutor<'_>,
    name: &str,
    except: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(except)
    .fetch_one(db)
    .await
}

pub async fn slug_taken(
    db: impl PgExecutor<'_>,
    slug: &str,
    except: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(slug)
    .bind(except)
    .fetch_one(db)
    .await
}

pub async fn insert_category(db: impl PgExecutor<'_>, category: &Category) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO categories ({CATEGORY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
    ))
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.icon_url)
    .bind(category.parent_id)
    .bind(category.created_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_category(db: impl PgExecutor<'_>, category: &Category) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE categories SET name = $2, slug = $3, description = $4, icon_url = $5, \
         parent_id = $6 WHERE id = $1",
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.icon_url)
    .bind(category.parent_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_category(db: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Serializes re-parenting for the rest of the transaction. The mode
/// conflicts with itself but not with plain reads.
pub async fn lock_for_reparent(db: impl PgExecutor<'_>) -> Result<(), sqlx::Error> {
    sqlx::query("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
        .execute(db)
        .await?;
    Ok(())
}

/// True when `candidate_parent` is `category_id` itself or one of its
/// descendants, i.e. re-parenting would close a loop.
pub async fn is_self_or_descendant(
    db: impl PgExecutor<'_>,
    category_id: Uuid,
    candidate_parent: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        WITH RECURSIVE subtree(id) AS (
            SELECT id FROM categories WHERE id = $1
            UNION
            SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id
        )
        SELECT EXISTS(SELECT 1 FROM subtree WHERE id = $2)
        "#,
    )
    .bind(category_id)
    .bind(candidate_parent)
    .fetch_one(db)
    .await
}
