// src/seed.rs
use crate::auth::password::hash_password;
use crate::config::Config;
use crate::db;
use crate::errors::AppResult;
use crate::models::{Category, User, UserRole};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@educationplatform.com";

/// (name, slug, description)
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 5] = [
    ("Programming", "programming", "Learn programming languages and frameworks"),
    ("Data Science", "data-science", "Data analysis, machine learning, and AI"),
    ("Web Development", "web-development", "Frontend and backend web technologies"),
    ("Mobile Development", "mobile-development", "iOS and Android app development"),
    ("Design", "design", "UI/UX and graphic design"),
];

/// Creates the admin account and the default categories when missing.
/// Safe to run on every start.
pub async fn seed_defaults(pool: &PgPool, config: &Config) -> AppResult<()> {
    seed_admin(pool, config.admin_password.as_deref()).await?;

    let mut created = 0;
    for (name, slug, description) in DEFAULT_CATEGORIES {
        if db::categories::name_taken(pool, name, None).await?
            || db::categories::slug_taken(pool, slug, None).await?
        {
            continue;
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: Some(description.to_string()),
            icon_url: None,
            parent_id: None,
            created_at: Utc::now(),
        };
        db::categories::insert_category(pool, &category).await?;
        created += 1;
    }
    tracing::info!("Seeded {} default categories", created);
    Ok(())
}

async fn seed_admin(pool: &PgPool, password: Option<&str>) -> AppResult<()> {
    if db::users::username_exists(pool, ADMIN_USERNAME).await? {
        return Ok(());
    }
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        tracing::warn!("ADMIN_PASSWORD is not set; skipping admin account creation");
        return Ok(());
    };

    let now = Utc::now();
    let admin = User {
        id: Uuid::new_v4(),
        username: ADMIN_USERNAME.to_string(),
        email: ADMIN_EMAIL.to_string(),
        password_hash: hash_password(password.to_string()).await?,
        full_name: "Administrator".to_string(),
        role: UserRole::Admin,
        bio: None,
        avatar_url: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db::users::create_user(pool, &admin).await?;
    tracing::info!("Created admin user '{}'", ADMIN_USERNAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slugify;

    #[test]
    fn default_category_slugs_match_their_names() {
        for (name, slug, _) in DEFAULT_CATEGORIES {
            assert_eq!(slugify(name), slug);
        }
    }
}
