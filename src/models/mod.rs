// src/models/mod.rs
pub mod category;
pub mod content;
pub mod enrollment;
pub mod pagination;
pub mod progress;
pub mod review;
pub mod user;

pub use category::{Category, CreateCategoryRequest, UpdateCategoryRequest, slugify};
pub use content::{
    Content, ContentListQuery, ContentRecord, ContentResponse, ContentSort, ContentType,
    CreateContentRequest, Tag, UpdateContentRequest, normalize_tags, tag_slug,
};
pub use enrollment::{
    CreateEnrollmentRequest, Enrollment, EnrollmentListQuery, UpdateEnrollmentRequest,
};
pub use pagination::{PageMeta, Pagination};
pub use progress::{Progress, ProgressListQuery, UpsertProgressRequest, clamp_percentage};
pub use review::{
    CreateReviewRequest, Review, ReviewListQuery, ReviewRecord, ReviewResponse, ReviewSort,
    UpdateReviewRequest,
};
pub use user::{
    LoginRequest, RegisterRequest, UpdateUserRequest, User, UserListQuery, UserResponse,
    UserRole, UserSummary,
};

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
/// in partial-update payloads. Use with `#[serde(default)]`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
