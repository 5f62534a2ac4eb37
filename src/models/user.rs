// src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::nullable;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Instructor,
    Admin,
}

impl UserRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(UserRole::Student),
            "instructor" => Some(UserRole::Instructor),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Self-registration may only pick student or instructor; anything else
    /// (admin included) falls back to student.
    pub fn for_registration(requested: Option<&str>) -> Self {
        match requested.and_then(Self::parse) {
            Some(UserRole::Instructor) => UserRole::Instructor,
            _ => UserRole::Student,
        }
    }

    pub fn can_author(self) -> bool {
        matches!(self, UserRole::Instructor | UserRole::Admin)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Profile as returned by the API. Email and `updated_at` are only filled
/// in for the account owner.
#[derive(Serialize, Debug, Clone)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserResponse {
    pub fn public(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: None,
            full_name: user.full_name.clone(),
            role: user.role,
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: None,
        }
    }

    pub fn private(user: &User) -> Self {
        Self {
            email: Some(user.email.clone()),
            updated_at: Some(user.updated_at),
            ..Self::public(user)
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<String>,
}

impl RegisterRequest {
    /// Trims and lowercases fields the way they are stored.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password,
            full_name: self.full_name.trim().to_string(),
            role: self.role,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.username.is_empty() || self.username.chars().count() > 80 {
            return Err("Username must be 1-80 characters".to_string());
        }
        if self.full_name.is_empty() || self.full_name.chars().count() > 200 {
            return Err("Full name must be 1-200 characters".to_string());
        }
        if !is_valid_email(&self.email) {
            return Err("Invalid email format".to_string());
        }
        validate_password(&self.password)
    }
}

pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 120 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty()
                && !host.starts_with('.')
                && !host.ends_with('.')
                && tld.len() >= 2
                && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err("Password must contain at least one letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    Ok(())
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }

    /// Role and activation changes are reserved for admins.
    pub fn touches_privileged_fields(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }

    pub fn apply(self, user: &mut User) -> Result<(), String> {
        if let Some(full_name) = self.full_name {
            let full_name = full_name.trim();
            if full_name.is_empty() || full_name.chars().count() > 200 {
                return Err("Full name must be 1-200 characters".to_string());
            }
            user.full_name = full_name.to_string();
        }
        if let Some(bio) = self.bio {
            user.bio = bio;
        }
        if let Some(avatar_url) = self.avatar_url {
            user.avatar_url = avatar_url;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub role: Option<UserRole>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            full_name: "Alice A".to_string(),
            role,
            bio: None,
            avatar_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            full_name: "Alice A".to_string(),
            role: None,
        }
    }

    #[test]
    fn registration_role_never_grants_admin() {
        assert_eq!(UserRole::for_registration(None), UserRole::Student);
        assert_eq!(
            UserRole::for_registration(Some("instructor")),
            UserRole::Instructor
        );
        assert_eq!(UserRole::for_registration(Some("admin")), UserRole::Student);
        assert_eq!(UserRole::for_registration(Some("wizard")), UserRole::Student);
    }

    #[test]
    fn accepts_reasonable_registration() {
        let req = register(" alice ", " Alice@Example.COM ", "pw12345").normalized();
        assert_eq!(req.username, "alice");
        assert_eq!(req.email, "alice@example.com");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["alice", "alice@", "@example.com", "a@b", "a b@example.com", "a@@x.com"] {
            let req = register("alice", email, "pw12345");
            assert_eq!(
                req.validate(),
                Err("Invalid email format".to_string()),
                "{email}"
            );
        }
    }

    #[test]
    fn rejects_weak_passwords() {
        assert!(validate_password("pw1").is_err());
        assert!(validate_password("abcdefgh").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("pw12345").is_ok());
    }

    #[test]
    fn rejects_blank_username_and_name() {
        assert!(register("", "a@example.com", "pw12345").validate().is_err());
        let mut req = register("alice", "a@example.com", "pw12345");
        req.full_name = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn public_profile_hides_email() {
        let user = sample_user(UserRole::Student);
        assert!(UserResponse::public(&user).email.is_none());
        assert_eq!(
            UserResponse::private(&user).email.as_deref(),
            Some("alice@example.com")
        );
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let mut user = sample_user(UserRole::Student);
        user.bio = Some("old".to_string());
        user.avatar_url = Some("http://x/a.png".to_string());

        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"bio": null, "full_name": "  Alice B "}"#).unwrap();
        assert!(!req.touches_privileged_fields());
        req.apply(&mut user).unwrap();

        assert_eq!(user.bio, None);
        assert_eq!(user.avatar_url.as_deref(), Some("http://x/a.png"));
        assert_eq!(user.full_name, "Alice B");
    }

    #[test]
    fn role_changes_are_privileged() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"role": "admin"}"#).unwrap();
        assert!(req.touches_privileged_fields());
        let empty: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
