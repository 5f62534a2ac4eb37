// src/auth/tokens.rs
use crate::config::Config;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Claims {
    pub sub: String, // user_id
    pub kind: TokenKind,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("token has the wrong type")]
    WrongKind,
    #[error("token subject is not a user id")]
    BadSubject,
}

#[derive(Serialize, Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies the HS256 bearer tokens handed out at register/login.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::minutes(config.access_token_ttl_minutes),
            Duration::days(config.refresh_token_ttl_days),
        )
    }

    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String, TokenError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id.to_string(),
            kind,
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenKind::Access)?,
            refresh_token: self.issue(user_id, TokenKind::Refresh)?,
        })
    }

    /// Returns the user id carried by a valid, unexpired token of `expected` kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Uuid, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        if data.claims.kind != expected {
            return Err(TokenError::WrongKind);
        }
        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::BadSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(15), Duration::days(7))
    }

    #[test]
    fn access_token_round_trips_user_id() {
        let user_id = Uuid::new_v4();
        let token = service().issue(user_id, TokenKind::Access).unwrap();
        assert_eq!(service().verify(&token, TokenKind::Access).unwrap(), user_id);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let pair = service().issue_pair(Uuid::new_v4()).unwrap();
        assert!(matches!(
            service().verify(&pair.refresh_token, TokenKind::Access),
            Err(TokenError::WrongKind)
        ));
        assert!(service().verify(&pair.refresh_token, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let other = TokenService::new(
            "another-secret-key-that-is-32-bytes-long",
            Duration::minutes(15),
            Duration::days(7),
        );
        let token = other.issue(Uuid::new_v4(), TokenKind::Access).unwrap();
        assert!(matches!(
            service().verify(&token, TokenKind::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let expired = TokenService::new(SECRET, Duration::minutes(-10), Duration::days(7));
        let token = expired.issue(Uuid::new_v4(), TokenKind::Access).unwrap();
        assert!(service().verify(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(service().verify("not-a-jwt", TokenKind::Access).is_err());
    }
}
