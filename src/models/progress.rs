// src/models/progress.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, FromRow, PartialEq)]
pub struct Progress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub completion_percentage: f64,
    pub last_position: Option<i32>,
    pub notes: Option<String>,
    pub bookmarked: bool,
    pub updated_at: DateTime<Utc>,
}

pub fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Only the supplied fields are written to an existing record.
#[derive(Deserialize, Debug, Clone)]
pub struct UpsertProgressRequest {
    pub content_id: Uuid,
    pub completion_percentage: Option<f64>,
    pub last_position: Option<i32>,
    pub notes: Option<String>,
    pub bookmarked: Option<bool>,
}

impl UpsertProgressRequest {
    pub fn clamped_percentage(&self) -> Option<f64> {
        self.completion_percentage.map(clamp_percentage)
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.last_position {
            Some(position) if position < 0 => Err("last_position must not be negative".to_string()),
            _ => Ok(()),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ProgressListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub bookmarked: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_range() {
        assert_eq!(clamp_percentage(-5.0), 0.0);
        assert_eq!(clamp_percentage(42.5), 42.5);
        assert_eq!(clamp_percentage(150.0), 100.0);
        assert_eq!(clamp_percentage(f64::NAN), 0.0);
        assert_eq!(clamp_percentage(f64::INFINITY), 100.0);
    }

    #[test]
    fn request_clamps_supplied_percentage_only() {
        let req: UpsertProgressRequest = serde_json::from_str(&format!(
            r#"{{"content_id": "{}", "completion_percentage": 140}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(req.clamped_percentage(), Some(100.0));

        let req: UpsertProgressRequest =
            serde_json::from_str(&format!(r#"{{"content_id": "{}"}}"#, Uuid::new_v4())).unwrap();
        assert_eq!(req.clamped_percentage(), None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_negative_position() {
        let req: UpsertProgressRequest = serde_json::from_str(&format!(
            r#"{{"content_id": "{}", "last_position": -4}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
