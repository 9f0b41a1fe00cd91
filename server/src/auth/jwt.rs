//! Stateless HS256 access and refresh tokens.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::types::UserType;

const ISSUER: &str = "recipebox";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token is invalid or expired")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token has wrong type")]
    WrongTokenType,

    #[error("Token is blacklisted")]
    Blacklisted,

    #[error("System time error")]
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
    pub jti: Uuid,
    pub token_type: TokenType,
    pub role: UserType,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl std::fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtHandler")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

fn now_secs() -> Result<u64, AuthError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AuthError::Clock)?
        .as_secs())
}

impl JwtHandler {
    pub fn new(secret: &str, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    fn issue(
        &self,
        user_id: Uuid,
        role: UserType,
        token_type: TokenType,
        ttl_secs: u64,
    ) -> Result<String, AuthError> {
        let now = now_secs()?;
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + ttl_secs,
            iss: ISSUER.to_string(),
            jti: Uuid::new_v4(),
            token_type,
            role,
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    pub fn create_access_token(&self, user_id: Uuid, role: UserType) -> Result<String, AuthError> {
        self.issue(user_id, role, TokenType::Access, self.access_ttl_secs)
    }

    pub fn create_token_pair(&self, user_id: Uuid, role: UserType) -> Result<TokenPair, AuthError> {
        let pair = TokenPair {
            access: self.create_access_token(user_id, role)?,
            refresh: self.issue(user_id, role, TokenType::Refresh, self.refresh_ttl_secs)?,
        };
        debug!(%user_id, "Issued token pair");
        Ok(pair)
    }

    fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType);
        }
        Ok(claims)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, TokenType::Access)
    }

    /// Signature, expiry and type only; the blacklist is checked by the caller.
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, TokenType::Refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> JwtHandler {
        JwtHandler::new("unit-test-secret", 300, 86400)
    }

    #[test]
    fn test_pair_round_trips_with_distinct_ids() {
        let jwt = handler();
        let user_id = Uuid::new_v4();
        let pair = jwt.create_token_pair(user_id, UserType::Creator).unwrap();

        let access = jwt.verify_access_token(&pair.access).unwrap();
        let refresh = jwt.verify_refresh_token(&pair.refresh).unwrap();

        assert_eq!(access.sub, user_id);
        assert_eq!(access.role, UserType::Creator);
        assert_eq!(refresh.sub, user_id);
        assert_ne!(access.jti, refresh.jti);
        assert_eq!(refresh.exp - refresh.iat, 86400);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let jwt = handler();
        let pair = jwt.create_token_pair(Uuid::new_v4(), UserType::Viewer).unwrap();

        assert!(matches!(
            jwt.verify_access_token(&pair.refresh),
            Err(AuthError::WrongTokenType)
        ));
        assert!(matches!(
            jwt.verify_refresh_token(&pair.access),
            Err(AuthError::WrongTokenType)
        ));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let token = JwtHandler::new("other-secret", 300, 300)
            .create_access_token(Uuid::new_v4(), UserType::Viewer)
            .unwrap();
        assert!(matches!(
            handler().verify_access_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = handler();
        let now = now_secs().unwrap();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 600,
            exp: now - 300,
            iss: ISSUER.to_string(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
            role: UserType::Viewer,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &jwt.encoding_key).unwrap();

        assert!(matches!(
            jwt.verify_access_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
