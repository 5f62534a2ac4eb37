// src/auth/password.rs
//! bcrypt hashing and verification on actix's blocking thread pool.
use crate::errors::{AppError, AppResult};
use actix_web::web;
use bcrypt::DEFAULT_COST;

fn pool_failure(e: actix_web::error::BlockingError) -> AppError {
    AppError::Internal(format!("blocking pool unavailable: {}", e))
}

pub async fn hash_password(password: String) -> AppResult<String> {
    let hashed = web::block(move || bcrypt::hash(password, DEFAULT_COST))
        .await
        .map_err(pool_failure)??;
    Ok(hashed)
}

/// `Ok(false)` for a wrong password; `Err` only when the stored hash is unreadable.
pub async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    let matched = web::block(move || bcrypt::verify(password, &hash))
        .await
        .map_err(pool_failure)??;
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("pw12345".to_string()).await.unwrap();
        assert_ne!(hashed, "pw12345");
        assert!(verify_password("pw12345".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify_password("pw54321".to_string(), hashed).await.unwrap());
    }

    #[actix_web::test]
    async fn garbage_hash_is_an_error() {
        let result = verify_password("pw12345".to_string(), "not-a-hash".to_string()).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
