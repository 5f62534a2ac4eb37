// src/routes/search.rs
use crate::db;
use crate::errors::AppResult;
use crate::models::{ContentResponse, Pagination};
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

pub const MIN_SUGGESTION_QUERY: usize = 2;
pub const DEFAULT_SUGGESTIONS: i64 = 10;
pub const MAX_SUGGESTIONS: i64 = 50;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(search);
    cfg.service(suggestions);
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub tags: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SuggestionQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

/// `"Python, backend ,,"` -> `["python", "backend"]`.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    let names: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::to_string)
        .collect();
    crate::models::normalize_tags(&names)
}

pub fn suggestion_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_SUGGESTIONS).clamp(1, MAX_SUGGESTIONS)
}

#[get("/search")]
pub async fn search(
    pool: web::Data<PgPool>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let text = query.q.as_deref().map(str::trim).unwrap_or_default();
    let tags = parse_tags(query.tags.as_deref());
    let page = Pagination::new(query.page, query.per_page);

    let filter_text = (!text.is_empty()).then_some(text);
    let (records, total) = db::search::search_content(pool.get_ref(), filter_text, &tags, page).await?;
    let results: Vec<ContentResponse> = records.into_iter().map(ContentResponse::summary).collect();

    Ok(HttpResponse::Ok().json(json!({
        "query": text,
        "results": results,
        "pagination": page.meta(total),
    })))
}

#[get("/search/suggestions")]
pub async fn suggestions(
    pool: web::Data<PgPool>,
    query: web::Query<SuggestionQuery>,
) -> AppResult<HttpResponse> {
    let text = query.q.as_deref().map(str::trim).unwrap_or_default();
    if text.chars().count() < MIN_SUGGESTION_QUERY {
        return Ok(HttpResponse::Ok().json(json!({ "suggestions": [] })));
    }

    let items =
        db::search::title_suggestions(pool.get_ref(), text, suggestion_limit(query.limit)).await?;
    Ok(HttpResponse::Ok().json(json!({ "suggestions": items })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_split_trimmed_and_lowercased() {
        assert_eq!(parse_tags(Some("Python, backend ,,")), vec!["python", "backend"]);
        assert_eq!(parse_tags(Some("rust,RUST")), vec!["rust"]);
        assert!(parse_tags(None).is_empty());
        assert!(parse_tags(Some(" , ")).is_empty());
    }

    #[test]
    fn suggestion_limit_is_bounded() {
        assert_eq!(suggestion_limit(None), 10);
        assert_eq!(suggestion_limit(Some(5)), 5);
        assert_eq!(suggestion_limit(Some(500)), 50);
        assert_eq!(suggestion_limit(Some(0)), 1);
    }
}
