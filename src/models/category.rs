// src/models/category.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::nullable;

#[derive(Serialize, Deserialize, Clone, Debug, FromRow, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// `"Web Development!"` -> `"web-development"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub parent_id: Option<Uuid>,
}

impl CreateCategoryRequest {
    pub fn build(self) -> Result<Category, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Category name required".to_string());
        }
        let slug = match self.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => slugify(&name),
        };
        if slug.is_empty() {
            return Err("Category slug must contain letters or digits".to_string());
        }
        Ok(Category {
            id: Uuid::new_v4(),
            name,
            slug,
            description: self.description,
            icon_url: self.icon_url,
            parent_id: self.parent_id,
            created_at: Utc::now(),
        })
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub icon_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent_id: Option<Option<Uuid>>,
}

impl UpdateCategoryRequest {
    /// The parent the category would end up with, when the patch changes it.
    pub fn new_parent(&self) -> Option<Uuid> {
        self.parent_id.flatten()
    }

    pub fn apply(self, category: &mut Category) -> Result<(), String> {
        if let Some(name) = self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err("Category name required".to_string());
            }
            category.name = name.to_string();
        }
        if let Some(slug) = self.slug {
            let slug = slug.trim();
            if slug.is_empty() {
                return Err("Category slug must not be empty".to_string());
            }
            category.slug = slug.to_string();
        }
        if let Some(description) = self.description {
            category.description = description;
        }
        if let Some(icon_url) = self.icon_url {
            category.icon_url = icon_url;
        }
        if let Some(parent_id) = self.parent_id {
            if parent_id == Some(category.id) {
                return Err("A category cannot be its own parent".to_string());
            }
            category.parent_id = parent_id;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Web Development"), "web-development");
        assert_eq!(slugify("  Data -- Science! "), "data-science");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn build_derives_slug_when_missing() {
        let category = CreateCategoryRequest {
            name: " Mobile Development ".to_string(),
            slug: None,
            description: None,
            icon_url: None,
            parent_id: None,
        }
        .build()
        .unwrap();
        assert_eq!(category.name, "Mobile Development");
        assert_eq!(category.slug, "mobile-development");
    }

    #[test]
    fn build_requires_name() {
        let result = CreateCategoryRequest {
            name: "   ".to_string(),
            slug: Some("x".to_string()),
            description: None,
            icon_url: None,
            parent_id: None,
        }
        .build();
        assert!(result.is_err());
    }

    #[test]
    fn update_rejects_self_parent() {
        let mut category = CreateCategoryRequest {
            name: "Design".to_string(),
            slug: None,
            description: None,
            icon_url: None,
            parent_id: None,
        }
        .build()
        .unwrap();
        let patch = UpdateCategoryRequest {
            parent_id: Some(Some(category.id)),
            ..Default::default()
        };
        assert!(patch.apply(&mut category).is_err());
    }

    #[test]
    fn update_can_clear_parent() {
        let mut category = CreateCategoryRequest {
            name: "Design".to_string(),
            slug: None,
            description: Some("UI/UX".to_string()),
            icon_url: None,
            parent_id: Some(Uuid::new_v4()),
        }
        .build()
        .unwrap();
        let patch: UpdateCategoryRequest = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(patch.new_parent(), None);
        patch.apply(&mut category).unwrap();
        assert_eq!(category.parent_id, None);
        assert_eq!(category.description.as_deref(), Some("UI/UX"));
    }
}
