use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::database::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub identity: String,
    pub name: String,
    pub roles: Vec<String>,
    pub branch: String,
    pub token_type: TokenType,
    /// Set only on access tokens issued straight from a password login
    pub fresh: bool,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

#[derive(Debug, thiserror::Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordError(String);

/// Signs and validates HS256 tokens with the configured secret and lifetimes
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            access_ttl: Duration::minutes(security.access_token_minutes),
            refresh_ttl: Duration::hours(security.refresh_token_hours),
        }
    }

    fn claims(&self, user: &User, token_type: TokenType, fresh: bool) -> Claims {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        Claims {
            identity: user.id.clone(),
            name: user.name.clone(),
            roles: user.roles.clone(),
            branch: user.branch.clone(),
            token_type,
            fresh,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn access_token(&self, user: &User, fresh: bool) -> Result<String, JwtError> {
        self.sign(&self.claims(user, TokenType::Access, fresh))
    }

    pub fn refresh_token(&self, user: &User) -> Result<String, JwtError> {
        self.sign(&self.claims(user, TokenType::Refresh, false))
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Decodes and checks signature and expiry; the caller checks `token_type`
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        decode::<Claims>(token, &key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError(e.to_string()))
}

/// A malformed stored hash counts as a mismatch
pub fn verify_password(password: &str, hashed: &str) -> bool {
    match PasswordHash::new(hashed) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn user() -> User {
        User {
            id: "budi".to_string(),
            name: "Budi".to_string(),
            email: String::new(),
            roles: vec!["NORMAL".to_string()],
            branch: "NORTH".to_string(),
            hashed_password: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn tokens_round_trip_through_validation() {
        let issuer = TokenIssuer::new(&AppConfig::development().security);
        let token = issuer.access_token(&user(), true).unwrap();
        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.identity, "budi");
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.fresh);

        let refresh = issuer.validate(&issuer.refresh_token(&user()).unwrap()).unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert!(!refresh.fresh);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let issuer = TokenIssuer::new(&AppConfig::development().security);
        let mut other = AppConfig::development().security;
        other.jwt_secret = "another-secret".to_string();
        let token = TokenIssuer::new(&other).access_token(&user(), false).unwrap();
        assert!(matches!(issuer.validate(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let issuer = TokenIssuer::new(&AppConfig::production().security);
        assert!(matches!(issuer.access_token(&user(), false), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
        assert!(!verify_password("secret1", "not-a-hash"));
    }
}
