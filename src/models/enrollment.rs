// src/models/enrollment.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, FromRow, PartialEq)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn new(user_id: Uuid, content_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content_id,
            enrolled_at: Utc::now(),
            completed_at: None,
            is_completed: false,
            last_accessed_at: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateEnrollmentRequest {
    pub content_id: Uuid,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateEnrollmentRequest {
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub touch_last_accessed: bool,
}

impl UpdateEnrollmentRequest {
    pub fn apply(self, enrollment: &mut Enrollment, now: DateTime<Utc>) {
        match self.is_completed {
            Some(true) if !enrollment.is_completed => {
                enrollment.is_completed = true;
                enrollment.completed_at = Some(now);
            }
            Some(false) => {
                enrollment.is_completed = false;
                enrollment.completed_at = None;
            }
            _ => {}
        }
        if self.touch_last_accessed {
            enrollment.last_accessed_at = Some(now);
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct EnrollmentListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub is_completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn completing_stamps_completion_time_once() {
        let mut enrollment = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
        let first = Utc::now();
        UpdateEnrollmentRequest {
            is_completed: Some(true),
            touch_last_accessed: false,
        }
        .apply(&mut enrollment, first);
        assert!(enrollment.is_completed);
        assert_eq!(enrollment.completed_at, Some(first));
        assert_eq!(enrollment.last_accessed_at, None);

        let later = first + Duration::hours(1);
        UpdateEnrollmentRequest {
            is_completed: Some(true),
            touch_last_accessed: true,
        }
        .apply(&mut enrollment, later);
        assert_eq!(enrollment.completed_at, Some(first));
        assert_eq!(enrollment.last_accessed_at, Some(later));
    }

    #[test]
    fn reopening_clears_completion() {
        let mut enrollment = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
        enrollment.is_completed = true;
        enrollment.completed_at = Some(Utc::now());
        UpdateEnrollmentRequest {
            is_completed: Some(false),
            touch_last_accessed: false,
        }
        .apply(&mut enrollment, Utc::now());
        assert!(!enrollment.is_completed);
        assert!(enrollment.completed_at.is_none());
    }
}
