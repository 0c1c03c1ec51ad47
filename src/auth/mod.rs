pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::config::{AdminConfig, SecurityConfig};
use crate::database::{users, Database, DatabaseError};

pub use password::{hash_password, verify_password, PasswordError};

/// Bearer token claims; `sub` is the account email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret is not configured")]
    InvalidSecret,

    #[error("unsupported JWT algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Signs and verifies access tokens with the configured shared secret
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    expiry: Duration,
}

impl TokenService {
    pub fn from_config(config: &SecurityConfig) -> Result<Self, JwtError> {
        if config.jwt_secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let algorithm = Algorithm::from_str(&config.jwt_algorithm)
            .map_err(|_| JwtError::UnsupportedAlgorithm(config.jwt_algorithm.clone()))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(JwtError::UnsupportedAlgorithm(config.jwt_algorithm.clone()));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            algorithm,
            expiry: Duration::minutes(config.jwt_expiry_minutes),
        })
    }

    pub fn issue(&self, email: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Make sure the configured admin account exists. Returns `true` when it
/// had to be created; an existing account is left untouched.
pub async fn bootstrap_admin(db: &Database, admin: &AdminConfig) -> Result<bool, BootstrapError> {
    let (Some(email), Some(password)) = (admin.email.as_deref(), admin.password.as_deref()) else {
        tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap");
        return Ok(false);
    };

    if users::find_by_email(db.pool(), email).await?.is_some() {
        tracing::debug!(%email, "admin account already present");
        return Ok(false);
    }

    let hash = hash_password(password)?;
    let user = users::insert(db.pool(), email, &hash, true).await?;
    tracing::info!(user_id = user.id, %email, "admin account created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::testing;

    fn service() -> TokenService {
        TokenService::from_config(&AppConfig::test().security).unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = service();
        let token = tokens.issue("admin@example.net").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin@example.net");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let token = tokens
            .encode(&Claims {
                sub: "admin@example.net".to_string(),
                exp: now - 10,
                iat: now - 100,
            })
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let mut other = AppConfig::test().security;
        other.jwt_secret = "some-other-secret".to_string();
        let token = TokenService::from_config(&other).unwrap().issue("a@b.c").unwrap();

        assert!(matches!(service().verify(&token), Err(JwtError::Invalid(_))));
        assert!(matches!(service().verify("not-a-token"), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn rejects_non_hmac_algorithm() {
        let mut config = AppConfig::test().security;
        config.jwt_algorithm = "RS256".to_string();
        assert!(matches!(
            TokenService::from_config(&config),
            Err(JwtError::UnsupportedAlgorithm(_))
        ));

        config.jwt_secret.clear();
        assert!(matches!(TokenService::from_config(&config), Err(JwtError::InvalidSecret)));
    }

    #[tokio::test]
    async fn bootstrap_creates_admin_once() {
        let db = testing::memory_database().await;
        let admin = AppConfig::test().admin;

        assert!(bootstrap_admin(&db, &admin).await.unwrap());
        assert!(!bootstrap_admin(&db, &admin).await.unwrap());

        let user = users::find_by_email(db.pool(), "admin_test@test.com")
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_admin);
        assert!(verify_password("admin_test", &user.password));
    }
}
