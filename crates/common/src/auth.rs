//! JWT issuing and validation.
//!
//! Tokens are HMAC-SHA256 signed bearer tokens. The subject claim carries the
//! user's email address, which the API middleware resolves back to a user row
//! on every request.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email address.
    pub sub: String,
    /// Expiry, as a Unix timestamp.
    pub exp: i64,
    /// Issued-at, as a Unix timestamp.
    pub iat: i64,
}

/// Signing and verification keys for access tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_secs: i64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Create keys from a shared secret.
    #[must_use]
    pub fn new(secret: &str, token_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    /// Issue a token for the given email address.
    pub fn issue(&self, email: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: email.to_string(),
            exp: now + self.token_ttl_secs,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// Expired or tampered tokens yield [`AppError::Unauthorized`].
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let keys = JwtKeys::new("test-secret", 3600);
        let token = keys.issue("alice@example.com").unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let keys = JwtKeys::new("secret-a", 3600);
        let other = JwtKeys::new("secret-b", 3600);
        let token = keys.issue("alice@example.com").unwrap();

        assert!(matches!(
            other.verify(&token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        // Negative TTL puts expiry in the past.
        let keys = JwtKeys::new("test-secret", -3600);
        let token = keys.issue("alice@example.com").unwrap();

        assert!(matches!(keys.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let keys = JwtKeys::new("test-secret", 3600);
        assert!(matches!(
            keys.verify("not-a-token"),
            Err(AppError::Unauthorized)
        ));
    }
}
