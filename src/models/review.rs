// src/models/review.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::nullable;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Serialize, Deserialize, Clone, Debug, FromRow, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_verified_purchase: bool,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review joined with the reviewer's public fields.
#[derive(Clone, Debug, FromRow)]
pub struct ReviewRecord {
    #[sqlx(flatten)]
    pub review: Review,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct Reviewer {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub review: Review,
    pub user: Reviewer,
}

impl From<ReviewRecord> for ReviewResponse {
    fn from(record: ReviewRecord) -> Self {
        let user = Reviewer {
            id: record.review.user_id,
            username: record.username,
            full_name: record.full_name,
            avatar_url: record.avatar_url,
        };
        Self {
            review: record.review,
            user,
        }
    }
}

fn validate_rating(rating: i64) -> Result<i32, String> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating as i32)
    } else {
        Err("Rating must be between 1 and 5".to_string())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateReviewRequest {
    pub content_id: Uuid,
    pub rating: i64,
    pub title: Option<String>,
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_rating(self.rating).map(|_| ())
    }

    pub fn build(self, user_id: Uuid, is_verified_purchase: bool) -> Result<Review, String> {
        let rating = validate_rating(self.rating)?;
        let now = Utc::now();
        Ok(Review {
            id: Uuid::new_v4(),
            user_id,
            content_id: self.content_id,
            rating,
            title: self.title,
            comment: self.comment,
            is_verified_purchase,
            helpful_count: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateReviewRequest {
    pub rating: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub comment: Option<Option<String>>,
}

impl UpdateReviewRequest {
    pub fn validate(&self) -> Result<(), String> {
        match self.rating {
            Some(rating) => validate_rating(rating).map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn apply(self, review: &mut Review) -> Result<(), String> {
        if let Some(rating) = self.rating {
            review.rating = validate_rating(rating)?;
        }
        if let Some(title) = self.title {
            review.title = title;
        }
        if let Some(comment) = self.comment {
            review.comment = comment;
        }
        review.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewSort {
    CreatedAt,
    Rating,
    Helpful,
}

impl ReviewSort {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("rating") => ReviewSort::Rating,
            Some("helpful") => ReviewSort::Helpful,
            _ => ReviewSort::CreatedAt,
        }
    }

    pub fn order_clause(self) -> &'static str {
        match self {
            ReviewSort::CreatedAt => " ORDER BY r.created_at DESC",
            ReviewSort::Rating => " ORDER BY r.rating DESC, r.created_at DESC",
            ReviewSort::Helpful => " ORDER BY r.helpful_count DESC, r.created_at DESC",
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ReviewListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rating: i64) -> CreateReviewRequest {
        CreateReviewRequest {
            content_id: Uuid::new_v4(),
            rating,
            title: Some("Great".to_string()),
            comment: None,
        }
    }

    #[test]
    fn accepts_ratings_one_through_five() {
        for rating in 1..=5 {
            assert!(request(rating).validate().is_ok());
        }
    }

    #[test]
    fn rejects_out_of_range_ratings() {
        for rating in [0, 6, -1, i64::MAX] {
            assert_eq!(
                request(rating).validate(),
                Err("Rating must be between 1 and 5".to_string())
            );
        }
    }

    #[test]
    fn build_records_verified_purchase() {
        let user = Uuid::new_v4();
        let review = request(4).build(user, true).unwrap();
        assert_eq!(review.user_id, user);
        assert_eq!(review.rating, 4);
        assert!(review.is_verified_purchase);
        assert_eq!(review.helpful_count, 0);
    }

    #[test]
    fn update_keeps_rating_when_invalid() {
        let mut review = request(3).build(Uuid::new_v4(), false).unwrap();
        let patch = UpdateReviewRequest {
            rating: Some(9),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(patch.apply(&mut review).is_err());
        assert_eq!(review.rating, 3);
    }

    #[test]
    fn update_clears_comment_on_null() {
        let mut review = request(3).build(Uuid::new_v4(), false).unwrap();
        review.comment = Some("meh".to_string());
        let patch: UpdateReviewRequest =
            serde_json::from_str(r#"{"comment": null, "rating": 5}"#).unwrap();
        patch.apply(&mut review).unwrap();
        assert_eq!(review.comment, None);
        assert_eq!(review.rating, 5);
        assert_eq!(review.title.as_deref(), Some("Great"));
    }

    #[test]
    fn response_nests_reviewer() {
        let review = request(5).build(Uuid::new_v4(), false).unwrap();
        let response = ReviewResponse::from(ReviewRecord {
            review: review.clone(),
            username: "carol".to_string(),
            full_name: "Carol C".to_string(),
            avatar_url: None,
        });
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["rating"], 5);
        assert_eq!(value["user"]["username"], "carol");
        assert_eq!(value["user"]["id"], review.user_id.to_string());
    }
}
