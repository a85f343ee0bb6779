// Token/session service
// Paired access/refresh JWTs. Access tokens are stateless; the one honored refresh
// token of each user is tracked in the cache so it can be superseded or revoked.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::cache::Cache;
use crate::cache::keys::refresh_token_key;
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Who a token was issued to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub student_id: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,         // user id
    pub student_id: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.sub.clone(),
            student_id: self.student_id.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct TokenService {
    cache: Cache,
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

fn fingerprint(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

impl TokenService {
    pub fn new(config: &Config, cache: Cache) -> Self {
        Self {
            cache,
            access_secret: config.jwt_secret.clone(),
            refresh_secret: config.refresh_token_secret.clone(),
            access_ttl: config.jwt_expiration(),
            refresh_ttl: config.refresh_token_expiration(),
        }
    }

    fn sign(&self, identity: &Identity, secret: &str, ttl: Duration) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: identity.user_id.clone(),
            student_id: identity.student_id.clone(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            exp: now + ttl.as_secs() as i64,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
    }

    fn decode(token: &str, secret: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }

    /// Issues a fresh pair; the new refresh token supersedes any earlier one
    pub async fn issue(&self, identity: &Identity) -> AppResult<TokenPair> {
        let access_token = self.sign(identity, &self.access_secret, self.access_ttl)?;
        let refresh_token = self.sign(identity, &self.refresh_secret, self.refresh_ttl)?;

        self.cache
            .set(
                &refresh_token_key(&identity.user_id),
                &fingerprint(&refresh_token),
                Some(self.refresh_ttl),
            )
            .await;
        tracing::debug!("Issued token pair for user {}", identity.user_id);

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl.as_secs(),
        })
    }

    pub fn verify_access(&self, token: &str) -> AppResult<Claims> {
        Self::decode(token, &self.access_secret)
    }

    /// Checks signature and expiry only; revocation is checked by [`TokenService::refresh`]
    pub fn verify_refresh(&self, token: &str) -> AppResult<Claims> {
        Self::decode(token, &self.refresh_secret)
    }

    /// Exchanges the user's current refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.verify_refresh(refresh_token)?;

        let current: Option<String> = self.cache.get(&refresh_token_key(&claims.sub)).await;
        if current.as_deref() != Some(fingerprint(refresh_token).as_str()) {
            tracing::warn!("Rejected superseded or revoked refresh token for {}", claims.sub);
            return Err(AppError::Unauthorized("revoked".to_string()));
        }

        self.issue(&claims.identity()).await
    }

    pub async fn revoke(&self, user_id: &str) {
        self.cache.delete(&refresh_token_key(user_id)).await;
        tracing::info!("Revoked refresh token of user {}", user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn identity() -> Identity {
        Identity {
            user_id: "user-001".into(),
            student_id: "STU2024001".into(),
            email: "john.doe@aivancity.edu".into(),
            role: "student".into(),
        }
    }

    fn service() -> TokenService {
        TokenService::new(&Config::for_mock(), Cache::in_memory())
    }

    #[tokio::test]
    async fn test_access_token_round_trips_identity() {
        let tokens = service();
        let pair = tokens.issue(&identity()).await.unwrap();

        let claims = tokens.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.identity(), identity());
        assert_eq!(pair.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_secrets_are_not_interchangeable() {
        let tokens = service();
        let pair = tokens.issue(&identity()).await.unwrap();

        assert_eq!(
            tokens.verify_access(&pair.refresh_token).unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
        assert!(tokens.verify_refresh(&pair.access_token).is_err());
    }

    #[tokio::test]
    async fn test_refresh_rotates_pair() {
        let tokens = service();
        let first = tokens.issue(&identity()).await.unwrap();

        let second = tokens.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        // The rotated-out token is no longer honored
        let err = tokens.refresh(&first.refresh_token).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(tokens.refresh(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_superseded_refresh_token_is_rejected() {
        let tokens = service();
        let first = tokens.issue(&identity()).await.unwrap();
        let _second = tokens.issue(&identity()).await.unwrap();

        let err = tokens.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "revoked"));
    }

    #[tokio::test]
    async fn test_revoked_user_cannot_refresh() {
        let tokens = service();
        let pair = tokens.issue(&identity()).await.unwrap();

        tokens.revoke("user-001").await;

        assert!(tokens.refresh(&pair.refresh_token).await.is_err());
        // Access tokens stay valid until they expire
        assert!(tokens.verify_access(&pair.access_token).is_ok());
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        let err = service().verify_access("not-a-jwt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}
