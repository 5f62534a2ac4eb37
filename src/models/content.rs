// src/models/content.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::nullable;
use super::user::UserSummary;

pub const DIFFICULTY_LEVELS: [&str; 3] = ["beginner", "intermediate", "advanced"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Article,
    Course,
    Quiz,
    Ebook,
    Podcast,
}

impl ContentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(ContentType::Video),
            "article" => Some(ContentType::Article),
            "course" => Some(ContentType::Course),
            "quiz" => Some(ContentType::Quiz),
            "ebook" => Some(ContentType::Ebook),
            "podcast" => Some(ContentType::Podcast),
            _ => None,
        }
    }
}

/// A row of the `content` table.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub content_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_minutes: Option<i32>,
    pub difficulty_level: Option<String>,
    pub language: String,
    pub price: f64,
    pub is_free: bool,
    pub is_published: bool,
    pub view_count: i64,
    pub rating_average: f64,
    pub rating_count: i64,
    pub instructor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub metadata_json: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Content {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.instructor_id == user_id
    }
}

/// Content joined with its instructor, category name and tag names.
#[derive(Clone, Debug, FromRow)]
pub struct ContentRecord {
    #[sqlx(flatten)]
    pub content: Content,
    pub instructor_username: String,
    pub instructor_full_name: String,
    pub category_name: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ContentDetails {
    pub content_url: Option<String>,
    pub metadata_json: Option<serde_json::Value>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ContentResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub thumbnail_url: Option<String>,
    pub duration_minutes: Option<i32>,
    pub difficulty_level: Option<String>,
    pub language: String,
    pub price: f64,
    pub is_free: bool,
    pub is_published: bool,
    pub view_count: i64,
    pub rating_average: f64,
    pub rating_count: i64,
    pub instructor: UserSummary,
    pub category: Option<CategorySummary>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: Option<ContentDetails>,
}

impl ContentResponse {
    /// Listing shape: no content URL or metadata.
    pub fn summary(record: ContentRecord) -> Self {
        let c = record.content;
        let category = match (c.category_id, record.category_name) {
            (Some(id), Some(name)) => Some(CategorySummary { id, name }),
            _ => None,
        };
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            content_type: c.content_type,
            thumbnail_url: c.thumbnail_url,
            duration_minutes: c.duration_minutes,
            difficulty_level: c.difficulty_level,
            language: c.language,
            price: c.price,
            is_free: c.is_free,
            is_published: c.is_published,
            view_count: c.view_count,
            rating_average: c.rating_average,
            rating_count: c.rating_count,
            instructor: UserSummary {
                id: c.instructor_id,
                username: record.instructor_username,
                full_name: record.instructor_full_name,
            },
            category,
            tags: record.tags,
            created_at: c.created_at,
            updated_at: c.updated_at,
            details: None,
        }
    }

    pub fn detailed(record: ContentRecord) -> Self {
        let details = ContentDetails {
            content_url: record.content.content_url.clone(),
            metadata_json: record.content.metadata_json.clone(),
        };
        Self {
            details: Some(details),
            ..Self::summary(record)
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow, PartialEq)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Lowercases, collapses whitespace and de-duplicates tag names, keeping
/// first-seen order.
pub fn normalize_tags(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

pub fn tag_slug(name: &str) -> String {
    name.replace(' ', "-")
}

fn validate_difficulty(level: &str) -> Result<(), String> {
    if DIFFICULTY_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err("Difficulty must be one of beginner, intermediate, advanced".to_string())
    }
}

fn validate_price(price: f64) -> Result<(), String> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err("Price must be a non-negative number".to_string())
    }
}

fn validate_duration(minutes: i32) -> Result<(), String> {
    if minutes >= 0 {
        Ok(())
    } else {
        Err("Duration must not be negative".to_string())
    }
}

fn validate_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateContentRequest {
    pub title: String,
    pub description: String,
    pub content_type: String,
    pub content_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_minutes: Option<i32>,
    pub difficulty_level: Option<String>,
    pub language: Option<String>,
    pub price: Option<f64>,
    pub is_free: Option<bool>,
    pub is_published: Option<bool>,
    pub category_id: Option<Uuid>,
    pub metadata_json: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
}

impl CreateContentRequest {
    /// Validates the payload and produces the row to insert plus the
    /// normalized tag names.
    pub fn build(self, instructor_id: Uuid) -> Result<(Content, Vec<String>), String> {
        validate_text("Title", &self.title)?;
        validate_text("Description", &self.description)?;
        let content_type =
            ContentType::parse(&self.content_type).ok_or_else(|| "Invalid content type".to_string())?;
        if let Some(level) = &self.difficulty_level {
            validate_difficulty(level)?;
        }
        let price = self.price.unwrap_or(0.0);
        validate_price(price)?;
        if let Some(minutes) = self.duration_minutes {
            validate_duration(minutes)?;
        }

        let now = Utc::now();
        let content = Content {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description,
            content_type,
            content_url: self.content_url,
            thumbnail_url: self.thumbnail_url,
            duration_minutes: self.duration_minutes,
            difficulty_level: self.difficulty_level,
            language: self.language.unwrap_or_else(|| "en".to_string()),
            price,
            is_free: self.is_free.unwrap_or(true),
            is_published: self.is_published.unwrap_or(false),
            view_count: 0,
            rating_average: 0.0,
            rating_count: 0,
            instructor_id,
            category_id: self.category_id,
            metadata_json: self.metadata_json,
            created_at: now,
            updated_at: now,
        };
        let tags = self.tags.as_deref().map(normalize_tags).unwrap_or_default();
        Ok((content, tags))
    }
}

/// Allow-listed fields an owner may change. Nullable columns accept an
/// explicit `null` to clear them.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub content_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub duration_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub difficulty_level: Option<Option<String>>,
    pub language: Option<String>,
    pub price: Option<f64>,
    pub is_free: Option<bool>,
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub metadata_json: Option<Option<serde_json::Value>>,
    pub tags: Option<Vec<String>>,
}

impl UpdateContentRequest {
    /// Applies supplied fields to `content`. Returns the replacement tag set
    /// when `tags` was supplied.
    pub fn apply(self, content: &mut Content) -> Result<Option<Vec<String>>, String> {
        if let Some(title) = self.title {
            validate_text("Title", &title)?;
            content.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            validate_text("Description", &description)?;
            content.description = description;
        }
        if let Some(url) = self.content_url {
            content.content_url = url;
        }
        if let Some(url) = self.thumbnail_url {
            content.thumbnail_url = url;
        }
        if let Some(minutes) = self.duration_minutes {
            if let Some(m) = minutes {
                validate_duration(m)?;
            }
            content.duration_minutes = minutes;
        }
        if let Some(level) = self.difficulty_level {
            if let Some(l) = &level {
                validate_difficulty(l)?;
            }
            content.difficulty_level = level;
        }
        if let Some(language) = self.language {
            validate_text("Language", &language)?;
            content.language = language;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
            content.price = price;
        }
        if let Some(is_free) = self.is_free {
            content.is_free = is_free;
        }
        if let Some(is_published) = self.is_published {
            content.is_published = is_published;
        }
        if let Some(category_id) = self.category_id {
            content.category_id = category_id;
        }
        if let Some(metadata) = self.metadata_json {
            content.metadata_json = metadata;
        }
        content.updated_at = Utc::now();
        Ok(self.tags.as_deref().map(normalize_tags))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentSort {
    CreatedAt,
    Rating,
    Views,
}

impl ContentSort {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("rating") => ContentSort::Rating,
            Some("views") => ContentSort::Views,
            _ => ContentSort::CreatedAt,
        }
    }

    pub fn order_clause(self) -> &'static str {
        match self {
            ContentSort::CreatedAt => " ORDER BY c.created_at DESC",
            ContentSort::Rating => " ORDER BY c.rating_average DESC, c.created_at DESC",
            ContentSort::Views => " ORDER BY c.view_count DESC, c.created_at DESC",
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ContentListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub category_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub is_free: Option<bool>,
    pub difficulty: Option<String>,
    pub language: Option<String>,
    pub sort_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateContentRequest {
        CreateContentRequest {
            title: "Intro to Rust".to_string(),
            description: "Ownership and borrowing".to_string(),
            content_type: "course".to_string(),
            content_url: None,
            thumbnail_url: None,
            duration_minutes: Some(90),
            difficulty_level: Some("beginner".to_string()),
            language: None,
            price: None,
            is_free: None,
            is_published: Some(true),
            category_id: None,
            metadata_json: None,
            tags: Some(vec!["Python".to_string(), "backend".to_string()]),
        }
    }

    #[test]
    fn build_applies_defaults_and_lowercases_tags() {
        let instructor = Uuid::new_v4();
        let (content, tags) = create_request().build(instructor).unwrap();
        assert_eq!(content.instructor_id, instructor);
        assert_eq!(content.content_type, ContentType::Course);
        assert_eq!(content.language, "en");
        assert_eq!(content.price, 0.0);
        assert!(content.is_free);
        assert!(content.is_published);
        assert_eq!(content.view_count, 0);
        assert_eq!(content.rating_count, 0);
        assert_eq!(tags, vec!["python", "backend"]);
    }

    #[test]
    fn build_rejects_unknown_type() {
        let mut req = create_request();
        req.content_type = "hologram".to_string();
        assert_eq!(
            req.build(Uuid::new_v4()).unwrap_err(),
            "Invalid content type"
        );
    }

    #[test]
    fn build_rejects_negative_price_and_bad_difficulty() {
        let mut req = create_request();
        req.price = Some(-1.0);
        assert!(req.build(Uuid::new_v4()).is_err());

        let mut req = create_request();
        req.difficulty_level = Some("expert".to_string());
        assert!(req.build(Uuid::new_v4()).is_err());
    }

    #[test]
    fn normalizes_and_dedupes_tags() {
        let names = vec![
            " Python ".to_string(),
            "python".to_string(),
            "".to_string(),
            "Web   Dev".to_string(),
        ];
        assert_eq!(normalize_tags(&names), vec!["python", "web dev"]);
        assert_eq!(tag_slug("web dev"), "web-dev");
    }

    #[test]
    fn update_only_touches_supplied_fields() {
        let (mut content, _) = create_request().build(Uuid::new_v4()).unwrap();
        content.thumbnail_url = Some("thumb.png".to_string());
        content.category_id = Some(Uuid::new_v4());

        let patch: UpdateContentRequest = serde_json::from_str(
            r#"{"title": "Advanced Rust", "category_id": null, "price": 12.5}"#,
        )
        .unwrap();
        let tags = patch.apply(&mut content).unwrap();

        assert_eq!(content.title, "Advanced Rust");
        assert_eq!(content.category_id, None);
        assert_eq!(content.price, 12.5);
        assert_eq!(content.thumbnail_url.as_deref(), Some("thumb.png"));
        assert_eq!(content.description, "Ownership and borrowing");
        assert!(tags.is_none());
    }

    #[test]
    fn update_ignores_fields_outside_allow_list() {
        let (mut content, _) = create_request().build(Uuid::new_v4()).unwrap();
        let owner = content.instructor_id;
        let patch: UpdateContentRequest = serde_json::from_str(
            r#"{"view_count": 999, "rating_average": 5.0, "instructor_id": "00000000-0000-0000-0000-000000000000"}"#,
        )
        .unwrap();
        patch.apply(&mut content).unwrap();
        assert_eq!(content.view_count, 0);
        assert_eq!(content.rating_average, 0.0);
        assert_eq!(content.instructor_id, owner);
    }

    #[test]
    fn update_returns_replacement_tags() {
        let (mut content, _) = create_request().build(Uuid::new_v4()).unwrap();
        let patch: UpdateContentRequest =
            serde_json::from_str(r#"{"tags": ["Rust", "RUST", "systems"]}"#).unwrap();
        assert_eq!(
            patch.apply(&mut content).unwrap(),
            Some(vec!["rust".to_string(), "systems".to_string()])
        );
    }

    #[test]
    fn update_rejects_blank_title() {
        let (mut content, _) = create_request().build(Uuid::new_v4()).unwrap();
        let patch: UpdateContentRequest = serde_json::from_str(r#"{"title": "  "}"#).unwrap();
        assert!(patch.apply(&mut content).is_err());
    }

    #[test]
    fn sort_defaults_to_newest() {
        assert_eq!(ContentSort::parse(None), ContentSort::CreatedAt);
        assert_eq!(ContentSort::parse(Some("bogus")), ContentSort::CreatedAt);
        assert_eq!(ContentSort::parse(Some("rating")), ContentSort::Rating);
        assert_eq!(ContentSort::parse(Some("views")), ContentSort::Views);
    }

    #[test]
    fn detailed_response_includes_url() {
        let (content, _) = create_request().build(Uuid::new_v4()).unwrap();
        let record = ContentRecord {
            content: Content {
                content_url: Some("https://cdn/x.mp4".to_string()),
                ..content
            },
            instructor_username: "bob".to_string(),
            instructor_full_name: "Bob B".to_string(),
            category_name: None,
            tags: vec!["python".to_string()],
        };
        let summary = serde_json::to_value(ContentResponse::summary(record.clone())).unwrap();
        assert!(summary.get("content_url").is_none());
        assert_eq!(summary["instructor"]["username"], "bob");
        assert_eq!(summary["category"], serde_json::Value::Null);

        let detailed = serde_json::to_value(ContentResponse::detailed(record)).unwrap();
        assert_eq!(detailed["content_url"], "https://cdn/x.mp4");
    }
}
